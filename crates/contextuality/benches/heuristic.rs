//! Benchmarks for the parallel local search.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use contextuality::assignment::{isotropic_lines, QuantumAssignment};
use contextuality::config::HeuristicConfig;
use contextuality::solver::heuristic::HeuristicSolver;
use contextuality::CancelFlag;

fn bench_heuristic(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristic");
    group.sample_size(10);
    let cancel = CancelFlag::new();

    for n in [2u32, 3].iter() {
        let pool = isotropic_lines(*n).unwrap();
        let qa = QuantumAssignment::new(&pool, *n).unwrap();
        let config = HeuristicConfig {
            iterations: 200,
            workers: 2,
            seed: Some(1),
            ..HeuristicConfig::default()
        };
        let solver = HeuristicSolver::new(&config, &cancel);

        group.bench_with_input(BenchmarkId::new("lines", n), n, |b, _| {
            b.iter(|| solver.solve(&qa).map(|outcome| outcome.distance));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_heuristic);
criterion_main!(benches);
