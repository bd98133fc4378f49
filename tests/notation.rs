use muehle::board::topology::NUM_POSITIONS;
use muehle::notation::{action_notation, format_board, parse_board, parse_label, parse_ply, ply_notation, pos_label};
use muehle::rules::Action;
use muehle::{legal_plies, GameState, MuehleError, Ply};
use pretty_assertions::assert_eq;

#[test]
fn labels_round_trip() {
    for pos in 0..NUM_POSITIONS {
        assert_eq!(parse_label(&pos_label(pos)).unwrap(), pos);
    }
    assert_eq!(pos_label(1), "d7");
    assert_eq!(pos_label(10), "b4");
    assert_eq!(parse_label("G1").unwrap(), 23);
}

#[test]
fn action_strings() {
    assert_eq!(action_notation(&Action::Place { dst: 0 }), "P:a7");
    assert_eq!(action_notation(&Action::Move { src: 0, dst: 1 }), "M:a7-d7");
    assert_eq!(action_notation(&Action::Remove { dst: 10 }), "R:b4");
}

#[test]
fn ply_strings() {
    assert_eq!(ply_notation(&Ply::step(0, 1).with_remove(10)), "M:a7-d7xb4");
    assert_eq!(ply_notation(&Ply::fly(23, 4)), "F:g1-d6");
    assert_eq!(ply_notation(&Ply::remove(10)), "R:b4");
    assert_eq!(Ply::place(16).to_string(), "P:d3");
}

#[test]
fn parses_what_it_prints() {
    for ply in legal_plies(&GameState::initial()) {
        assert_eq!(parse_ply(&ply_notation(&ply)).unwrap(), ply);
    }
    let fused = Ply::fly(3, 7).with_remove(22);
    assert_eq!(parse_ply(&fused.to_string()).unwrap(), fused);
    assert_eq!(parse_ply(" r:b4 ").unwrap(), Ply::remove(10));
}

#[test]
fn rejects_garbage() {
    for bad in ["", "P", "X:a7", "M:a7", "P:d4", "R:b4xa7", "M:a7-z9"] {
        let err = parse_ply(bad).unwrap_err();
        assert!(matches!(err, MuehleError::Notation { .. }), "{bad:?} gave {err:?}");
    }
}

#[test]
fn board_strings() {
    let board = parse_board("W.B..... ........ .....W.B").unwrap();
    assert_eq!(format_board(&board), format!("W.B{}W.B", ".".repeat(18)));
    assert_eq!(parse_board(&format_board(&board)).unwrap(), board);
    assert!(parse_board("W.B").is_err());
    assert!(parse_board(&"Z".repeat(NUM_POSITIONS)).is_err());
}
