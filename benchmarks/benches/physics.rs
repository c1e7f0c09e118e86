//! Collision core benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench physics
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench physics -- broadphase

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::Vec2;
use spellcore::physics::narrowphase::{aabb_aabb, circle_circle, circle_polygon, polygon_polygon};
use spellcore::{Hitbox, SpatialIndex};
use spellcore_bench::*;

// ---------------------------------------------------------------------------
// Broadphase
// ---------------------------------------------------------------------------

fn bench_broadphase(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("broadphase/query_neighborhood");
        for &n in &[100, 500, 1000, 2000] {
            let physics = setup_circle_world(n, 4.0);
            let probes: Vec<Vec2> = physics
                .bodies()
                .map(|e| physics.body(e).map(|b| b.position()).unwrap_or(Vec2::ZERO))
                .collect();
            group.bench_with_input(BenchmarkId::from_parameter(n), &probes, |b, probes| {
                b.iter(|| {
                    probes
                        .iter()
                        .map(|p| physics.query_neighborhood(*p).count())
                        .sum::<usize>()
                });
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("broadphase/rehome");
        let mut world = hecs::World::new();
        let ids: Vec<_> = (0..1000).map(|i| world.spawn((i,))).collect();
        group.bench_function("cross_cell_1000", |b| {
            b.iter_batched(
                || {
                    let mut index = SpatialIndex::new(128.0).expect("cell size");
                    for (i, e) in ids.iter().enumerate() {
                        index.insert(*e, Vec2::new(i as f32, 0.0));
                    }
                    index
                },
                |mut index| {
                    for (i, e) in ids.iter().enumerate() {
                        let old = index.cell_key_of(Vec2::new(i as f32, 0.0));
                        let new = index.cell_key_of(Vec2::new(i as f32 + 128.0, 0.0));
                        index.rehome(*e, old, new);
                    }
                },
                criterion::BatchSize::SmallInput,
            );
        });
        group.bench_function("same_cell_1000", |b| {
            let mut index = SpatialIndex::new(128.0).expect("cell size");
            for e in &ids {
                index.insert(*e, Vec2::splat(5.0));
            }
            b.iter(|| {
                for e in &ids {
                    index.rehome(*e, (0, 0), (0, 0));
                }
            });
        });
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Narrowphase
// ---------------------------------------------------------------------------

fn bench_narrowphase(c: &mut Criterion) {
    let square = vec![
        Vec2::new(-1.0, -1.0),
        Vec2::new(1.0, -1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(-1.0, 1.0),
    ];

    {
        let mut group = c.benchmark_group("narrowphase/circle_circle");
        group.bench_function("intersecting", |b| {
            b.iter(|| circle_circle(Vec2::ZERO, 1.0, Vec2::new(1.5, 0.0), 1.0));
        });
        group.bench_function("separated", |b| {
            b.iter(|| circle_circle(Vec2::ZERO, 1.0, Vec2::new(5.0, 0.0), 1.0));
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("narrowphase/aabb_aabb");
        let half = Vec2::splat(1.0);
        group.bench_function("intersecting", |b| {
            b.iter(|| aabb_aabb(Vec2::ZERO, half, Vec2::new(1.5, 0.0), half));
        });
        group.bench_function("separated", |b| {
            b.iter(|| aabb_aabb(Vec2::ZERO, half, Vec2::new(5.0, 0.0), half));
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("narrowphase/polygon_polygon");
        group.bench_function("intersecting", |b| {
            b.iter(|| polygon_polygon(Vec2::ZERO, &square, Vec2::new(1.5, 0.0), &square));
        });
        group.bench_function("separated", |b| {
            b.iter(|| polygon_polygon(Vec2::ZERO, &square, Vec2::new(5.0, 0.0), &square));
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("narrowphase/circle_polygon");
        group.bench_function("face", |b| {
            b.iter(|| circle_polygon(Vec2::new(1.5, 0.0), 0.6, Vec2::ZERO, &square));
        });
        group.bench_function("corner", |b| {
            b.iter(|| circle_polygon(Vec2::new(1.5, 1.5), 0.6, Vec2::ZERO, &square));
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("narrowphase/dispatch");
        let circle = Hitbox::circle(Vec2::ZERO, 1.0).expect("circle");
        let rect = Hitbox::rect(Vec2::new(1.5, 0.0), 2.0, 2.0).expect("rect");
        let obb = Hitbox::rect(Vec2::new(1.5, 0.0), 2.0, 2.0).expect("rect").with_rotation(0.785);
        let hexagon = Hitbox::regular_polygon(Vec2::new(1.5, 0.0), 1.0, 6).expect("hexagon");

        group.bench_function("circle_circle", |b| {
            b.iter(|| circle.is_colliding(&Hitbox::circle(Vec2::new(1.5, 0.0), 1.0).expect("circle")));
        });
        group.bench_function("rect_rect", |b| {
            b.iter(|| rect.is_colliding(&Hitbox::rect(Vec2::ZERO, 2.0, 2.0).expect("rect")));
        });
        group.bench_function("obb_rect", |b| {
            b.iter(|| obb.is_colliding(&rect));
        });
        group.bench_function("circle_polygon", |b| {
            b.iter(|| circle.is_colliding(&hexagon));
        });
        group.bench_function("far_rejected", |b| {
            let far = Hitbox::regular_polygon(Vec2::new(500.0, 0.0), 1.0, 6).expect("hexagon");
            b.iter(|| hexagon.is_colliding(&far));
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("narrowphase/rotation");
        for &sides in &[3usize, 6, 12, 24] {
            let mut hitbox = Hitbox::regular_polygon(Vec2::ZERO, 10.0, sides).expect("polygon");
            let mut angle = 0.0f32;
            group.bench_with_input(BenchmarkId::from_parameter(sides), &sides, |b, _| {
                b.iter(|| {
                    angle += 0.01;
                    hitbox.set_rotation(angle);
                });
            });
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

fn bench_pipeline(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("pipeline/step");
        group.sample_size(30);
        for &n in &[100, 500, 1000, 2000] {
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
                b.iter_batched(
                    || setup_mixed_world(n, 4.0),
                    |mut physics| {
                        physics.step(1.0 / 60.0);
                    },
                    criterion::BatchSize::LargeInput,
                );
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("pipeline/density");
        group.sample_size(30);
        for &per_cell in &[1.0f32, 4.0, 16.0] {
            group.bench_with_input(
                BenchmarkId::from_parameter(per_cell),
                &per_cell,
                |b, &per_cell| {
                    b.iter_batched(
                        || setup_circle_world(1000, per_cell),
                        |mut physics| {
                            physics.step(1.0 / 60.0);
                        },
                        criterion::BatchSize::LargeInput,
                    );
                },
            );
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("pipeline/swarm_60frames");
        group.sample_size(10);
        for &n in &[100, 500] {
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
                b.iter_batched(
                    || setup_swarm(n),
                    |(mut physics, ids)| {
                        for _ in 0..60 {
                            run_swarm_frame(&mut physics, &ids);
                        }
                    },
                    criterion::BatchSize::LargeInput,
                );
            });
        }
        group.finish();
    }
}

criterion_group!(benches, bench_broadphase, bench_narrowphase, bench_pipeline);
criterion_main!(benches);
