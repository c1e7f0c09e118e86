//! Headless arena: a player, an enemy swarm, projectiles, and a wall,
//! driven through the collision core for a fixed number of frames.
//!
//! Usage: `spellcore-sim [frames]` (default 600). Set `RUST_LOG=debug` to see
//! spawns, despawns, and deferred commands from the core.

use anyhow::{Context, bail};
use glam::Vec2;
use spellcore::{
    BodyDesc, BodyKind, CollisionResponse, DebugDraw, Health, Hitbox, PhysicsConfig,
    PhysicsWorld,
};

const PLAYER: BodyKind = BodyKind(0);
const ENEMY: BodyKind = BodyKind(1);
const PROJECTILE: BodyKind = BodyKind(2);
const CONSTRUCT: BodyKind = BodyKind(3);

const DT: f32 = 1.0 / 60.0;
const FIRE_INTERVAL: u64 = 15;
const PROJECTILE_SPEED: f32 = 700.0;
const PROJECTILE_TTL: u64 = 90;
const PROJECTILE_DAMAGE: u32 = 10;
const ENEMY_PULL: f32 = 900.0;

/// Damage an enemy deals per frame of contact.
struct Damage(u32);

/// Frame at which the body expires.
struct Expiry(u64);

/// Counts overlay primitives instead of drawing them.
#[derive(Default)]
struct OverlayStats {
    lines: usize,
    circles: usize,
}

impl DebugDraw for OverlayStats {
    fn line(&mut self, _from: Vec2, _to: Vec2) {
        self.lines += 1;
    }

    fn circle(&mut self, _center: Vec2, _radius: f32) {
        self.circles += 1;
    }
}

struct Arena {
    physics: PhysicsWorld,
    player: hecs::Entity,
    kills: u32,
    shots: u32,
}

impl Arena {
    fn new() -> anyhow::Result<Self> {
        let mut physics =
            PhysicsWorld::new(PhysicsConfig::default()).context("invalid physics config")?;

        let player = physics.spawn(
            BodyDesc::new(Hitbox::circle(Vec2::ZERO, 16.0).context("player hitbox")?)
                .kind(PLAYER)
                .health(Health::Finite(1000)),
        );

        // Enemies in a ring, alternating circles and hexagons.
        for i in 0..48 {
            let angle = i as f32 * std::f32::consts::TAU / 48.0;
            let center = Vec2::from_angle(angle) * (300.0 + (i % 4) as f32 * 40.0);
            let hitbox = if i % 2 == 0 {
                Hitbox::circle(center, 12.0).context("enemy circle")?
            } else {
                Hitbox::regular_polygon(center, 14.0, 6).context("enemy hexagon")?
            };
            let enemy = physics.spawn(
                BodyDesc::new(hitbox)
                    .kind(ENEMY)
                    .health(Health::Finite(30))
                    .push_resistance(0.8),
            );
            physics.attach(enemy, Damage(1))?;
        }

        // An indestructible wall between the player and part of the ring.
        physics.spawn(
            BodyDesc::new(Hitbox::rect(Vec2::new(120.0, 40.0), 120.0, 24.0).context("wall hitbox")?)
                .angle(0.6)
                .kind(CONSTRUCT)
                .indestructible()
                .response(CollisionResponse::IMMOVABLE),
        );

        Ok(Self {
            physics,
            player,
            kills: 0,
            shots: 0,
        })
    }

    fn player_alive(&self) -> bool {
        self.physics
            .body(self.player)
            .map(|b| !b.is_depleted())
            .unwrap_or(false)
    }

    /// Pull every enemy toward the player.
    fn steer_enemies(&mut self) -> anyhow::Result<()> {
        let target = self.physics.body(self.player)?.position();
        let enemies: Vec<_> = self
            .physics
            .bodies()
            .filter(|e| self.physics.body(*e).map_or(false, |b| b.kind == ENEMY))
            .collect();
        for e in enemies {
            let mut body = self.physics.body_mut(e)?;
            let dir = (target - body.position()).normalize_or_zero();
            body.apply_force(dir * ENEMY_PULL);
        }
        Ok(())
    }

    /// Fire at the nearest enemy within range.
    fn fire(&mut self, frame: u64) -> anyhow::Result<()> {
        let origin = self.physics.body(self.player)?.position();
        let nearest = self
            .physics
            .query_radius(origin, 400.0)
            .filter_map(|e| {
                let body = self.physics.body(e).ok()?;
                if body.kind == ENEMY {
                    Some(body.position())
                } else {
                    None
                }
            })
            .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)));
        let Some(target) = nearest else {
            return Ok(());
        };

        let dir = (target - origin).normalize_or_zero();
        let projectile = self.physics.spawn(
            BodyDesc::new(Hitbox::circle(origin + dir * 24.0, 5.0)?)
                .kind(PROJECTILE)
                .ignore_body(self.player)
                .ignore_kind(PROJECTILE)
                .push_strength(0.3)
                .damping(1.0)
                .velocity(dir * PROJECTILE_SPEED),
        );
        self.physics.attach(projectile, Expiry(frame + PROJECTILE_TTL))?;
        self.shots += 1;
        Ok(())
    }

    fn run_frame(&mut self, frame: u64) -> anyhow::Result<()> {
        self.steer_enemies()?;
        if frame % FIRE_INTERVAL == 0 {
            self.fire(frame)?;
        }

        // Bodies cannot be read while the world is stepping, so hits are
        // resolved after the pass.
        let mut projectile_hits = Vec::new();
        let mut enemy_hits = Vec::new();
        self.physics.step_with(DT, |contact, commands| match (contact.kind, contact.other_kind) {
            (PROJECTILE, ENEMY) => {
                projectile_hits.push(contact.other);
                commands.despawn(contact.body);
            }
            (ENEMY, PLAYER) => enemy_hits.push(contact.body),
            _ => {}
        });

        for enemy in projectile_hits {
            if let Ok(mut body) = self.physics.body_mut(enemy) {
                body.take_damage(PROJECTILE_DAMAGE);
            }
        }
        for enemy in enemy_hits {
            let amount = self.physics.ecs().get::<&Damage>(enemy).map_or(0, |d| d.0);
            self.physics.body_mut(self.player)?.take_damage(amount);
        }

        // Despawn depleted and expired bodies, in registration order.
        let dead: Vec<_> = self
            .physics
            .bodies()
            .filter(|e| {
                let depleted = self.physics.body(*e).map_or(false, |b| b.is_depleted());
                let expired = self
                    .physics
                    .ecs()
                    .get::<&Expiry>(*e)
                    .map_or(false, |x| x.0 <= frame);
                (depleted || expired) && *e != self.player
            })
            .collect();
        for e in dead {
            let body = self.physics.despawn(e)?;
            if body.kind == ENEMY {
                self.kills += 1;
                log::debug!("enemy {e:?} destroyed at {:?}", body.position());
            }
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let frames: u64 = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("frame count must be an integer, got {arg:?}"))?,
        None => 600,
    };
    if frames == 0 {
        bail!("frame count must be positive");
    }

    let mut arena = Arena::new()?;
    log::info!("arena ready with {} bodies", arena.physics.len());

    for frame in 0..frames {
        arena.run_frame(frame)?;
        if frame % 60 == 59 {
            let hp = arena.physics.body(arena.player)?.health.remaining();
            log::info!(
                "frame {}: {} bodies, {} contacts, player hp {:?}, kills {}",
                frame + 1,
                arena.physics.len(),
                arena.physics.contacts().len(),
                hp,
                arena.kills
            );
        }
        if !arena.player_alive() {
            log::info!("player defeated at frame {}", frame + 1);
            break;
        }
    }

    let mut overlay = OverlayStats::default();
    arena.physics.draw_debug(&mut overlay, Vec2::ZERO);
    log::info!(
        "done after {} passes: {} shots, {} kills, overlay {} lines / {} circles",
        arena.physics.frame(),
        arena.shots,
        arena.kills,
        overlay.lines,
        overlay.circles
    );
    Ok(())
}
