use muehle::board::topology::NUM_POSITIONS;
use muehle::rules::{apply_action, is_terminal, legal_actions, removable_positions, winner, Action};
use muehle::{GameState, MuehleError, Phase, Player, Stone};
use pretty_assertions::assert_eq;

fn board_with(white: &[usize], black: &[usize]) -> [Stone; NUM_POSITIONS] {
    let mut b = [Stone::Empty; NUM_POSITIONS];
    for &p in white { b[p] = Stone::White; }
    for &p in black { b[p] = Stone::Black; }
    b
}

#[test]
fn closing_a_mill_keeps_the_turn_until_removal() {
    let s = GameState::new(board_with(&[0, 1], &[9, 10]), Player::White, 7, 7).unwrap();
    let t = apply_action(&s, Action::Place { dst: 2 }).unwrap();
    assert!(t.pending_remove());
    assert_eq!(t.to_move(), Player::White);
    assert_eq!(t.turn_no(), s.turn_no());
    assert_eq!(legal_actions(&t), vec![Action::Remove { dst: 9 }, Action::Remove { dst: 10 }]);
}

#[test]
fn removing_a_lone_stone_completes_the_turn() {
    let s = GameState::new(board_with(&[0, 1, 2], &[10]), Player::White, 6, 8)
        .unwrap()
        .with_pending_remove(true);
    assert_eq!(removable_positions(&s, Player::Black), vec![10]);
    let t = apply_action(&s, Action::Remove { dst: 10 }).unwrap();
    assert_eq!(t.stone_at(10), Stone::Empty);
    assert!(!t.pending_remove());
    assert_eq!(t.to_move(), Player::Black);
    assert_eq!(t.turn_no(), s.turn_no() + 1);
}

#[test]
fn mill_stones_are_protected_unless_all_are_in_mills() {
    let s = GameState::new(board_with(&[0, 1, 2], &[21, 22, 23, 10]), Player::White, 6, 5)
        .unwrap()
        .with_pending_remove(true);
    assert_eq!(removable_positions(&s, Player::Black), vec![10]);

    let s = GameState::new(board_with(&[0, 1, 2], &[21, 22, 23]), Player::White, 6, 6)
        .unwrap()
        .with_pending_remove(true);
    assert_eq!(removable_positions(&s, Player::Black), vec![21, 22, 23]);
}

#[test]
fn removing_own_or_empty_square_is_illegal() {
    let s = GameState::new(board_with(&[0, 1, 2], &[10]), Player::White, 6, 8)
        .unwrap()
        .with_pending_remove(true);
    assert!(matches!(apply_action(&s, Action::Remove { dst: 0 }), Err(MuehleError::IllegalAction(_))));
    assert!(matches!(apply_action(&s, Action::Remove { dst: 5 }), Err(MuehleError::IllegalAction(_))));
}

#[test]
fn placing_on_occupied_square_is_rejected() {
    let s = GameState::new(board_with(&[4], &[]), Player::Black, 8, 9).unwrap();
    let err = apply_action(&s, Action::Place { dst: 4 }).unwrap_err();
    assert_eq!(err, MuehleError::IllegalAction(Action::Place { dst: 4 }));
}

#[test]
fn moving_phase_only_steps_to_empty_neighbours() {
    let s = GameState::new(board_with(&[0, 4, 13, 20], &[1, 9, 22, 23]), Player::White, 0, 0).unwrap();
    assert_eq!(s.phase(Player::White), Phase::Moving);
    let acts = legal_actions(&s);
    assert!(acts.contains(&Action::Move { src: 4, dst: 3 }));
    assert!(!acts.contains(&Action::Move { src: 0, dst: 1 }));
    assert!(!acts.contains(&Action::Move { src: 0, dst: 2 }));
    assert!(acts.iter().all(|a| matches!(a, Action::Move { .. })));
}

#[test]
fn three_stones_without_hand_may_fly() {
    let s = GameState::new(board_with(&[0, 4, 13], &[1, 9, 22, 23]), Player::White, 0, 0).unwrap();
    assert_eq!(s.phase(Player::White), Phase::Flying);
    assert_eq!(s.phase(Player::Black), Phase::Moving);
    let empties = s.empty_positions().count();
    assert_eq!(legal_actions(&s).len(), 3 * empties);
}

#[test]
fn fewer_than_three_stones_loses_after_placing() {
    let s = GameState::new(board_with(&[0, 4, 13], &[1, 9]), Player::Black, 0, 0).unwrap();
    assert_eq!(winner(&s), Some(Player::White));
    assert!(is_terminal(&s));

    // Still placing: two stones on the board is fine.
    let s = GameState::new(board_with(&[0, 4, 13], &[1, 9]), Player::Black, 0, 2).unwrap();
    assert_eq!(winner(&s), None);
}

#[test]
fn blocked_side_to_move_loses() {
    let s = GameState::new(board_with(&[1, 9, 14, 22], &[0, 2, 21, 23]), Player::Black, 0, 0).unwrap();
    assert!(legal_actions(&s).is_empty());
    assert_eq!(winner(&s), Some(Player::White));
}

#[test]
fn impossible_stone_counts_are_rejected() {
    let err = GameState::new(board_with(&[0, 1, 2], &[]), Player::White, 7, 9).unwrap_err();
    assert!(matches!(err, MuehleError::InvalidStateShape(_)));
    let ten: Vec<usize> = (0..10).collect();
    assert!(GameState::from_board(board_with(&ten, &[]), Player::White).is_err());
}
