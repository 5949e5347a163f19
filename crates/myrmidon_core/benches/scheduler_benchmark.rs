//! # Scheduler Frame Benchmark
//!
//! Cost of one full frame (sort, step, purge, render) on dummy backends,
//! and of spawn/destroy churn.
//!
//! Run with: `cargo bench --package myrmidon_core --bench scheduler_benchmark`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use myrmidon_core::prelude::*;

fn mover() -> RoutineBlueprint {
    RoutineBlueprint::new("mover", |_| {
        routine(|ctx| {
            ctx.entity_mut()?.move_forward(1.0, 30.0);
            Ok(Step::Continue)
        })
    })
}

/// Benchmark: one frame with N stepping entities.
fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_frame");

    for count in [100_usize, 1_000, 4_000] {
        let mut scheduler = Scheduler::headless();
        for _ in 0..count {
            scheduler.spawn(mover()).unwrap();
        }

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                scheduler.run_frame().unwrap();
                black_box(scheduler.frame())
            });
        });
    }
    group.finish();
}

/// Benchmark: spawn a short-lived entity and purge it every frame.
fn bench_churn(c: &mut Criterion) {
    c.bench_function("spawn_destroy_churn", |b| {
        let mut scheduler = Scheduler::headless();
        b.iter(|| {
            let spark = RoutineBlueprint::new("spark", |_| routine(|_ctx| Ok(Step::finish())));
            let id = scheduler.spawn(spark).unwrap();
            scheduler.run_frame().unwrap();
            black_box(id)
        });
    });
}

criterion_group!(benches, bench_frame, bench_churn);
criterion_main!(benches);
