use criterion::{criterion_group, criterion_main, Criterion, black_box};
use muehle::{GameState, Limits, Player, Stone};

fn midgame() -> GameState {
    let mut board = [Stone::Empty; 24];
    for p in [0, 4, 7, 13, 19] { board[p] = Stone::White; }
    for p in [1, 9, 12, 16, 22] { board[p] = Stone::Black; }
    GameState::new(board, Player::White, 0, 0).expect("valid midgame")
}

fn bench_search(c: &mut Criterion) {
    let s = GameState::initial();
    c.bench_function("analyze_depth_3_initial", |ben| {
        ben.iter(|| {
            let r = muehle::analyze(black_box(&s), &Limits::depth(3), None);
            black_box(r.nodes)
        })
    });
    let m = midgame();
    c.bench_function("analyze_depth_4_moving", |ben| {
        ben.iter(|| {
            let r = muehle::analyze(black_box(&m), &Limits::depth(4), None);
            black_box(r.nodes)
        })
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
