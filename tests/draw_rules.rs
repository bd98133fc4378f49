use muehle::board::state::DrawTracker;
use muehle::board::topology::NUM_POSITIONS;
use muehle::rules::draw_reason;
use muehle::{play_ply, DrawReason, GameState, Player, Ply, Stone};

fn board_with(white: &[usize], black: &[usize]) -> [Stone; NUM_POSITIONS] {
    let mut b = [Stone::Empty; NUM_POSITIONS];
    for &p in white { b[p] = Stone::White; }
    for &p in black { b[p] = Stone::Black; }
    b
}

fn moving_position() -> GameState {
    GameState::new(board_with(&[3, 5, 21, 23], &[6, 8, 15, 17]), Player::White, 0, 0).unwrap()
}

#[test]
fn twentieth_quiet_move_draws() {
    let s = moving_position().with_draw(DrawTracker { no_mill_moves: 19, position_history: Vec::new() });
    assert_eq!(draw_reason(&s), None);
    let t = play_ply(&s, &Ply::step(3, 10)).unwrap();
    assert_eq!(t.draw().no_mill_moves, 20);
    assert_eq!(draw_reason(&t), Some(DrawReason::NoMill20));
}

#[test]
fn placements_do_not_advance_quiet_counter() {
    let s = GameState::initial().with_draw(DrawTracker { no_mill_moves: 19, position_history: Vec::new() });
    let t = play_ply(&s, &Ply::place(4)).unwrap();
    assert_eq!(t.draw().no_mill_moves, 19);
    assert_eq!(draw_reason(&t), None);
}

#[test]
fn closing_a_mill_resets_quiet_counter() {
    let s = GameState::new(board_with(&[0, 1, 14, 5], &[6, 8, 15, 17]), Player::White, 0, 0)
        .unwrap()
        .with_draw(DrawTracker { no_mill_moves: 12, position_history: Vec::new() });
    let t = play_ply(&s, &Ply::step(14, 2).with_remove(15)).unwrap();
    assert_eq!(t.draw().no_mill_moves, 0);
}

#[test]
fn history_is_seeded_with_the_starting_position() {
    let s = moving_position();
    let t = play_ply(&s, &Ply::step(3, 10)).unwrap();
    assert_eq!(t.draw().position_history.len(), 2);
}

#[test]
fn shuttling_back_and_forth_is_a_threefold_draw() {
    let cycle = [Ply::step(3, 10), Ply::step(6, 7), Ply::step(10, 3), Ply::step(7, 6)];
    let mut s = moving_position();
    for (i, ply) in cycle.iter().chain(cycle.iter()).enumerate() {
        assert_eq!(draw_reason(&s), None, "premature draw before ply {i}");
        s = play_ply(&s, ply).unwrap();
    }
    assert_eq!(draw_reason(&s), Some(DrawReason::Threefold));
    assert_eq!(s.draw().no_mill_moves, 8);
}
