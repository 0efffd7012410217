//! Criterion benchmarks for the steward search hot loops.
//!
//! Run with: `cargo bench -p steward-core`
//!
//! These benchmarks measure the performance-critical paths:
//! - Enumerating combinations
//! - Evaluating a combo against every scenario
//! - Offering results to the best-N retention structure

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use steward_core::{
    evaluate_combo, synthetic_catalog, BestN, Combinations, Combo, ComboResult, FaultCatalog,
    SearchProblem,
};

fn synthetic_problem(stewards: usize, scenarios: usize, f: usize) -> SearchProblem {
    let raw = synthetic_catalog(stewards, scenarios, 0.3, 42);
    let catalog = FaultCatalog::from_raw(&raw).expect("synthetic catalog is valid");
    SearchProblem::new(catalog, f).expect("f fits the steward count")
}

/// Benchmark raw enumeration throughput
fn bench_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumeration");

    for n in [12usize, 16, 20].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter(|| Combinations::new(black_box(n), 4).count());
        });
    }

    group.finish();
}

/// Benchmark scoring one combo (core hot loop)
fn bench_evaluate_combo(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_combo");

    for scenarios in [12usize, 50, 200].iter() {
        let problem = synthetic_problem(20, *scenarios, 2);
        let combo = Combo::new((0..problem.m()).collect());

        group.bench_with_input(
            BenchmarkId::from_parameter(scenarios),
            scenarios,
            |b, _| {
                b.iter(|| {
                    let _ = evaluate_combo(black_box(&problem), combo.clone());
                });
            },
        );
    }

    group.finish();
}

/// Benchmark retention under a long stream of mostly losing offers
fn bench_best_n_offer(c: &mut Criterion) {
    let mut group = c.benchmark_group("best_n_offer");

    let results: Vec<ComboResult> = (0..10_000)
        .map(|i| {
            let score = -((i * 7919) % 10_007) as f64 * 0.01;
            ComboResult::new(Combo::new(vec![i, i + 1, i + 2, i + 3]), score)
        })
        .collect();

    for capacity in [10usize, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            capacity,
            |b, &capacity| {
                b.iter(|| {
                    let mut best = BestN::new(capacity).expect("capacity in range");
                    for r in &results {
                        best.offer(black_box(r.clone()));
                    }
                    best.into_sorted()
                });
            },
        );
    }

    group.finish();
}

/// Benchmark a full serial search over a small catalog
fn bench_serial_search(c: &mut Criterion) {
    let problem = synthetic_problem(14, 12, 1);

    c.bench_function("serial_search_14_choose_4", |b| {
        b.iter(|| {
            let mut best = BestN::new(10).expect("capacity in range");
            for combo in Combinations::new(problem.catalog().steward_count(), problem.m()) {
                if let Ok(result) = evaluate_combo(&problem, combo) {
                    best.offer(result);
                }
            }
            best.into_sorted()
        });
    });
}

criterion_group!(
    benches,
    bench_enumeration,
    bench_evaluate_combo,
    bench_best_n_offer,
    bench_serial_search,
);
criterion_main!(benches);
