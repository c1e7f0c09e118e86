//! Scene builders shared by the benchmarks.
//!
//! Layouts come from a fixed-seed ChaCha8 stream so every run benchmarks the
//! same scene.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spellcore::{BodyDesc, Hitbox, PhysicsConfig, PhysicsWorld};

/// Side of the square area holding `n` bodies at the given density
/// (bodies per 128x128 cell).
fn arena_side(n: usize, per_cell: f32) -> f32 {
    (n as f32 / per_cell).sqrt() * 128.0
}

/// Circle bodies scattered uniformly, about `per_cell` per index cell.
pub fn setup_circle_world(n: usize, per_cell: f32) -> PhysicsWorld {
    let mut physics = PhysicsWorld::new(PhysicsConfig::default()).expect("default config");
    let side = arena_side(n, per_cell);
    let mut rng = ChaCha8Rng::seed_from_u64(n as u64);
    for _ in 0..n {
        let center = Vec2::new(rng.gen_range(0.0..side), rng.gen_range(0.0..side));
        let hitbox = Hitbox::circle(center, rng.gen_range(6.0..20.0)).expect("circle");
        physics.spawn(BodyDesc::new(hitbox));
    }
    physics
}

/// Circles, rotated rects, and hexagons in equal parts.
pub fn setup_mixed_world(n: usize, per_cell: f32) -> PhysicsWorld {
    let mut physics = PhysicsWorld::new(PhysicsConfig::default()).expect("default config");
    let side = arena_side(n, per_cell);
    let mut rng = ChaCha8Rng::seed_from_u64(n as u64 ^ 0x5eed);
    for i in 0..n {
        let center = Vec2::new(rng.gen_range(0.0..side), rng.gen_range(0.0..side));
        let hitbox = match i % 3 {
            0 => Hitbox::circle(center, rng.gen_range(6.0..20.0)).expect("circle"),
            1 => Hitbox::rect(center, rng.gen_range(10.0..40.0), rng.gen_range(10.0..40.0))
                .expect("rect")
                .with_rotation(rng.gen_range(0.0..TAU)),
            _ => Hitbox::regular_polygon(center, rng.gen_range(6.0..20.0), 6).expect("hexagon"),
        };
        let velocity = Vec2::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
        physics.spawn(BodyDesc::new(hitbox).velocity(velocity));
    }
    physics
}

/// Enemy swarm converging on a player at the origin; every body is pulled
/// toward the center each frame, so cells stay crowded.
pub fn setup_swarm(n: usize) -> (PhysicsWorld, Vec<hecs::Entity>) {
    let mut physics = PhysicsWorld::new(PhysicsConfig::default()).expect("default config");
    let mut rng = ChaCha8Rng::seed_from_u64(0xfeed);
    let player = Hitbox::circle(Vec2::ZERO, 16.0).expect("circle");
    let mut ids = vec![physics.spawn(BodyDesc::new(player))];
    let radius = arena_side(n, 4.0) * 0.5;
    for _ in 0..n {
        let angle = rng.gen_range(0.0..TAU);
        let center = Vec2::from_angle(angle) * rng.gen_range(radius * 0.2..radius);
        ids.push(physics.spawn(BodyDesc::new(Hitbox::circle(center, 12.0).expect("circle"))));
    }
    (physics, ids)
}

/// One swarm frame: steer every enemy toward the player, then step.
pub fn run_swarm_frame(physics: &mut PhysicsWorld, ids: &[hecs::Entity]) {
    let Some((&player, enemies)) = ids.split_first() else {
        return;
    };
    let target = physics.body(player).map(|b| b.position()).unwrap_or(Vec2::ZERO);
    for &e in enemies {
        if let Ok(mut body) = physics.body_mut(e) {
            let dir = (target - body.position()).normalize_or_zero();
            body.apply_force(dir * 800.0);
        }
    }
    physics.step(1.0 / 60.0);
}
