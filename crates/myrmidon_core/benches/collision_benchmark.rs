//! # Collision Dispatch Benchmark
//!
//! Narrow-phase tests between every primitive pair, plus a full
//! `collide_with` sweep over a crowd of entities.
//!
//! Run with: `cargo bench --package myrmidon_core --bench collision_benchmark`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use myrmidon_core::collision::{collide, Circle, CollisionGeometry, OrientedRect};
use myrmidon_core::prelude::*;

fn rect(x: f64, y: f64, rotation: f64) -> CollisionGeometry {
    CollisionGeometry::Rectangle(OrientedRect::new(
        Vec2::new(x, y),
        rotation,
        Vec2::new(-16.0, -8.0),
        Vec2::new(32.0, 16.0),
    ))
}

fn circle(x: f64, y: f64) -> CollisionGeometry {
    CollisionGeometry::Circle(Circle {
        centre: Vec2::new(x, y),
        radius: 12.0,
    })
}

/// Benchmark: one test per primitive pair.
fn bench_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("collide_pair");
    let pairs = [
        ("rect_rect_rotated", rect(0.0, 0.0, 30.0), rect(20.0, 10.0, 75.0)),
        ("rect_circle", rect(0.0, 0.0, 45.0), circle(18.0, 4.0)),
        ("circle_circle", circle(0.0, 0.0), circle(20.0, 10.0)),
        ("point_rect", CollisionGeometry::Point(Vec2::new(3.0, 3.0)), rect(0.0, 0.0, 15.0)),
    ];

    for (name, a, b) in pairs {
        group.bench_function(name, |bench| {
            bench.iter(|| collide(black_box(&a), black_box(&b)));
        });
    }
    group.finish();
}

/// Benchmark: one probe against N entities, worst case (no hit).
fn bench_collide_with(c: &mut Criterion) {
    let mut group = c.benchmark_group("collide_with");

    for count in [100_usize, 1_000] {
        let mut scheduler = Scheduler::headless();
        let probe = scheduler
            .spawn(RoutineBlueprint::idle("probe").with_defaults(|e| {
                e.set_collision(CollisionShape::rectangle(10.0, 10.0));
                e.set_position(Vec2::new(-1000.0, -1000.0));
            }))
            .unwrap();

        for i in 0..count {
            #[allow(clippy::cast_precision_loss)]
            let x = (i % 50) as f64 * 20.0;
            #[allow(clippy::cast_precision_loss)]
            let y = (i / 50) as f64 * 20.0;
            scheduler
                .spawn(RoutineBlueprint::idle("rock").with_defaults(move |e| {
                    e.set_collision(CollisionShape::circle(8.0));
                    e.set_position(Vec2::new(x, y));
                }))
                .unwrap();
        }
        let rocks = scheduler.entities_of_kind("rock");

        group.bench_with_input(BenchmarkId::from_parameter(count), &rocks, |b, rocks| {
            b.iter(|| scheduler.collide_with(probe, rocks.iter().copied()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pairs, bench_collide_with);
criterion_main!(benches);
