use muehle::board::topology::NUM_POSITIONS;
use muehle::board::state::STONES_PER_PLAYER;
use muehle::rules::winner;
use muehle::{apply_ply, legal_plies, play_ply, GameState, MuehleError, Player, Ply, PlyKind, Stone};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn board_with(white: &[usize], black: &[usize]) -> [Stone; NUM_POSITIONS] {
    let mut b = [Stone::Empty; NUM_POSITIONS];
    for &p in white { b[p] = Stone::White; }
    for &p in black { b[p] = Stone::Black; }
    b
}

#[test]
fn mill_closure_fans_out_over_removal_targets() {
    let s = GameState::new(board_with(&[0, 1], &[9, 10]), Player::White, 7, 7).unwrap();
    let plies = legal_plies(&s);
    let closing: Vec<&Ply> = plies.iter().filter(|p| p.dst == Some(2)).collect();
    assert_eq!(closing.len(), 2);
    assert!(closing.iter().all(|p| p.is_capture()));
    // 20 empty squares, one of which expands into two plies.
    assert_eq!(plies.len(), 21);
}

#[test]
fn fused_ply_completes_the_turn() {
    let s = GameState::new(board_with(&[0, 1], &[9, 10]), Player::White, 7, 7).unwrap();
    let t = apply_ply(&s, &Ply::place(2).with_remove(9)).unwrap();
    assert_eq!(t.stone_at(9), Stone::Empty);
    assert_eq!(t.stone_at(2), Stone::White);
    assert!(!t.pending_remove());
    assert_eq!(t.to_move(), Player::Black);
    assert_eq!(t.turn_no(), s.turn_no() + 1);
}

#[test]
fn malformed_plies_are_rejected() {
    let s = GameState::new(board_with(&[0, 1], &[9, 10]), Player::White, 7, 7).unwrap();
    let missing_removal = apply_ply(&s, &Ply::place(2));
    assert!(matches!(missing_removal, Err(MuehleError::MalformedPly { .. })));

    let spurious_removal = apply_ply(&s, &Ply::place(5).with_remove(9));
    assert!(matches!(spurious_removal, Err(MuehleError::MalformedPly { .. })));

    let early_fly = apply_ply(&s, &Ply::fly(0, 5));
    assert!(matches!(early_fly, Err(MuehleError::MalformedPly { .. })));
}

#[test]
fn pending_state_only_accepts_remove_plies() {
    let s = GameState::new(board_with(&[0, 1, 2], &[10]), Player::White, 6, 8)
        .unwrap()
        .with_pending_remove(true);
    assert_eq!(legal_plies(&s), vec![Ply::remove(10)]);
    assert!(apply_ply(&s, &Ply::place(5)).is_err());
    let t = apply_ply(&s, &Ply::remove(10)).unwrap();
    assert_eq!(t.to_move(), Player::Black);
}

#[test]
fn flying_plies_use_fly_kind() {
    let s = GameState::new(board_with(&[0, 4, 13], &[1, 9, 22, 23]), Player::White, 0, 0).unwrap();
    let plies = legal_plies(&s);
    assert!(!plies.is_empty());
    assert!(plies.iter().all(|p| p.kind == PlyKind::Fly));
}

#[test]
fn mill_closure_against_empty_board_needs_no_removal() {
    let s = GameState::new(board_with(&[0, 1], &[]), Player::White, 7, 9).unwrap();
    assert!(legal_plies(&s).contains(&Ply::place(2)));
    let t = apply_ply(&s, &Ply::place(2)).unwrap();
    assert!(!t.pending_remove());
    assert_eq!(t.to_move(), Player::Black);
    assert_eq!(t.turn_no(), s.turn_no() + 1);
}

#[test]
fn random_playouts_keep_state_consistent() {
    for seed in 0..8u64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut s = GameState::initial();
        for _ in 0..120 {
            if winner(&s).is_some() {
                break;
            }
            let plies = legal_plies(&s);
            if plies.is_empty() {
                break;
            }
            let ply = plies[rng.gen_range(0..plies.len())];
            let turn = s.turn_no();
            let mover = s.to_move();
            s = play_ply(&s, &ply).expect("generated ply must apply");
            assert!(!s.pending_remove());
            assert_eq!(s.to_move(), mover.opponent());
            assert_eq!(s.turn_no(), turn + 1);
            for p in Player::BOTH {
                assert!(s.in_hand(p) as usize + s.stones_on_board(p) <= STONES_PER_PLAYER as usize);
            }
        }
    }
}
