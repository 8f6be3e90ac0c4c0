//! Benchmarks for the symplectic primitives, the sign oracle and scoring.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use contextuality::assignment::{isotropic_lines, Candidate, QuantumAssignment};
use contextuality::oracle::is_negative;
use contextuality::symplectic::{inner_product, observable_count, Observable};

fn bench_inner_product(c: &mut Criterion) {
    let mut group = c.benchmark_group("inner_product");

    for n in [2u32, 4, 8, 12].iter() {
        let words = observable_count(*n) as u32;
        let a = Observable::new(words / 3);
        let b = Observable::new(words / 2 + 1);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, &n| {
            bench.iter(|| black_box(inner_product(black_box(a), black_box(b), n)));
        });
    }

    group.finish();
}

fn bench_is_negative(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_negative");
    let troily = isotropic_lines(3).unwrap();
    group.throughput(Throughput::Elements(troily.len() as u64));

    group.bench_function("troily_lines", |b| {
        b.iter(|| {
            troily
                .iter()
                .filter(|points| is_negative(black_box(points), 3).unwrap_or(false))
                .count()
        });
    });

    group.finish();
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    for n in [2u32, 3, 4].iter() {
        let pool = isotropic_lines(*n).unwrap();
        let qa = QuantumAssignment::new(&pool, *n).unwrap();
        let mut candidate = Candidate::all_positive(*n).unwrap();
        for word in (1..observable_count(*n) as u32).step_by(3) {
            candidate.flip(Observable::new(word));
        }
        // Warm the sign cache outside the timed loop.
        let _ = qa.negative_count();

        group.throughput(Throughput::Elements(qa.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| black_box(qa.score(black_box(&candidate))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_inner_product, bench_is_negative, bench_score);
criterion_main!(benches);
