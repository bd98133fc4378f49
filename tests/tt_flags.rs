use muehle::board::topology::{apply_symmetry, symmetries, NUM_POSITIONS};
use muehle::board::zobrist::{position_key, position_key_with_symmetry};
use muehle::search::alphabeta::Searcher;
use muehle::search::tt::{Bound, EntryKind};
use muehle::{analyze, GameState, Limits, Player, Stone};

fn board_with(white: &[usize], black: &[usize]) -> [Stone; NUM_POSITIONS] {
    let mut b = [Stone::Empty; NUM_POSITIONS];
    for &p in white { b[p] = Stone::White; }
    for &p in black { b[p] = Stone::Black; }
    b
}

#[test]
fn tt_exact_after_search() {
    let s = GameState::initial();
    let limits = Limits::depth(3);
    let mut searcher = Searcher::new(&limits, Player::White);
    searcher.analyze(&s, 3);
    let e = searcher.tt_probe(&s).expect("tt entry missing");
    assert_eq!(e.1, Bound::Exact, "expected exact bound at the root");
    assert!(e.0 >= 3, "expected stored depth >= 3, got {}", e.0);
}

#[test]
fn tt_depth_preferred_not_replaced() {
    let s = GameState::initial();
    let limits = Limits::depth(3);
    let mut searcher = Searcher::new(&limits, Player::White);
    searcher.analyze(&s, 3);
    let d1 = searcher.tt_probe(&s).unwrap().0;
    searcher.analyze(&s, 1);
    let d2 = searcher.tt_probe(&s).unwrap().0;
    assert!(d2 >= d1, "shallower search should not lower stored TT depth");
}

#[test]
fn disabled_tt_stores_nothing() {
    let s = GameState::initial();
    let limits = Limits { use_tt: false, ..Limits::depth(2) };
    let mut searcher = Searcher::new(&limits, Player::White);
    let r = searcher.analyze(&s, 2);
    assert!(searcher.tt_probe(&s).is_none());
    assert_eq!(r.tt_hits + r.tt_misses, 0);
}

#[test]
fn tt_does_not_change_root_score() {
    let s = GameState::initial();
    let with = analyze(&s, &Limits::depth(3), None);
    let without = analyze(&s, &Limits { use_tt: false, ..Limits::depth(3) }, None);
    assert!((with.score - without.score).abs() < 1e-9, "{} vs {}", with.score, without.score);
    assert!(with.tt_hits > 0, "mirrored openings should hit the table");
}

#[test]
fn mirrored_position_hits_canonical_entry_without_move() {
    let base = GameState::new(board_with(&[0, 1, 4, 10], &[9, 14, 16, 21]), Player::White, 0, 0).unwrap();
    let images: Vec<GameState> = symmetries().iter().map(|m| base.with_board(apply_symmetry(base.board(), m))).collect();
    let canon = position_key_with_symmetry(&base);
    let searched = images.iter().find(|s| position_key(s) != canon).expect("non-canonical image");
    let mirror = images
        .iter()
        .find(|s| position_key(s) != canon && position_key(s) != position_key(searched))
        .expect("second non-canonical image");

    let mut searcher = Searcher::new(&Limits::depth(2), Player::White);
    let first = searcher.analyze(searched, 2);

    let (full, symmetric) = searcher.tt_entry(searched).expect("raw entry missing");
    assert!(!symmetric);
    assert!(matches!(full.kind, EntryKind::Full { best: Some(_) }), "{:?}", full.kind);

    let (e, symmetric) = searcher.tt_entry(mirror).expect("canonical entry missing");
    assert!(symmetric, "mirror must miss its raw key");
    assert_eq!(e.kind, EntryKind::ScoreOnly);
    assert_eq!(e.best(), None);
    assert_eq!(e.depth, full.depth);
    assert_eq!(e.score, full.score);

    let second = searcher.analyze(mirror, 2);
    assert!(second.tt_hits > first.tt_hits, "mirrored children should hit canonical entries");
    assert!((second.score - first.score).abs() < 1e-9);
}
