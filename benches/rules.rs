//! 走法生成与走子基准
//!
//! 运行: `cargo bench`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use xiangqi_rules::{check_move, legal_moves, parse_fen, test_positions, GameState};

/// 叶子节点计数，对局结束的局面不再展开
fn perft(state: &GameState, depth: u32) -> u64 {
    if depth == 0 || state.is_over() {
        return 1;
    }
    legal_moves(state.board(), state.turn())
        .into_iter()
        .map(|mv| perft(&state.apply_move(mv.from, mv.to).0, depth - 1))
        .sum()
}

fn benchmark_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("LegalMoves");
    for (name, fen) in test_positions::ALL {
        let Ok(state) = parse_fen(fen) else { continue };
        group.bench_function(name, |b| {
            b.iter(|| black_box(legal_moves(state.board(), state.turn())));
        });
    }
    group.finish();
}

fn benchmark_perft(c: &mut Criterion) {
    let state = GameState::reset();
    let mut group = c.benchmark_group("Perft");
    for depth in [1, 2, 3] {
        group.bench_with_input(BenchmarkId::new("start", depth), &depth, |b, &depth| {
            b.iter(|| black_box(perft(&state, black_box(depth))));
        });
    }
    group.finish();
}

fn benchmark_check_move(c: &mut Criterion) {
    let state = GameState::reset();
    let moves = legal_moves(state.board(), state.turn());
    c.bench_function("check_move/start", |b| {
        b.iter(|| {
            for mv in &moves {
                let _ = black_box(check_move(state.board(), state.turn(), mv.from, mv.to));
            }
        });
    });
}

criterion_group!(
    benches,
    benchmark_legal_moves,
    benchmark_perft,
    benchmark_check_move
);
criterion_main!(benches);
