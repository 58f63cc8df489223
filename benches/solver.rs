//! Solver and generator benchmarks.
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use water_sort::{DifficultyProfile, decode, generate, solve};

fn bench_solve(c: &mut Criterion) {
    let mut g = c.benchmark_group("solve");
    for code in ["AB../BA../..../....", "ABCA/BCAB/CABC/..../...."] {
        let board = decode(code).expect("benchmark board");
        g.bench_with_input(BenchmarkId::new("bfs", code), &board, |b, board| {
            b.iter(|| black_box(solve(black_box(board), 1_000_000, 0, true)))
        });
    }
    g.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut g = c.benchmark_group("generate");
    for level in [1u32, 24, 50] {
        let profile = DifficultyProfile::for_level(level);
        g.bench_with_input(BenchmarkId::new("level", level), &profile, |b, profile| {
            b.iter(|| black_box(generate(black_box(10_991), profile)))
        });
    }
    g.finish();
}

criterion_group!(benches, bench_solve, bench_generate);
criterion_main!(benches);
