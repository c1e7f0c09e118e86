//! Movable physical objects.
//!
//! A [`Body`] lives as a component on a `hecs` entity owned by
//! [`PhysicsWorld`](super::PhysicsWorld). Its position is read-only from the
//! outside: moving a body goes through integration or
//! [`PhysicsWorld::teleport`](super::PhysicsWorld::teleport) so that the
//! spatial index registration never goes stale.

use glam::Vec2;

use crate::error::Result;

use super::broadphase::CellKey;
use super::hitbox::Hitbox;
use super::response::{CollisionFilter, CollisionResponse};

/// Gameplay-defined body class, used by per-kind ignore rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyKind(pub u32);

/// Remaining hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Finite(u32),
    Indestructible,
}

impl Default for Health {
    fn default() -> Self {
        Health::Finite(1)
    }
}

impl Health {
    /// Subtract `amount`, clamping at zero. Returns the damage actually applied.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        match self {
            Health::Indestructible => 0,
            Health::Finite(hp) => {
                let applied = amount.min(*hp);
                *hp -= applied;
                applied
            }
        }
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        matches!(self, Health::Finite(0))
    }

    /// Remaining hit points, `None` when indestructible.
    #[inline]
    pub fn remaining(&self) -> Option<u32> {
        match self {
            Health::Finite(hp) => Some(*hp),
            Health::Indestructible => None,
        }
    }
}

/// A movable object with a hitbox, health, and a collision-response policy.
#[derive(Debug, Clone)]
pub struct Body {
    pub(crate) position: Vec2,
    pub(crate) previous_position: Vec2,
    pub(crate) velocity: Vec2,
    /// Accumulated force for the next integration; reset afterwards.
    pub(crate) acceleration: Vec2,
    /// Queued velocity change, consumed by the next integration.
    pub(crate) impulse: Vec2,
    pub(crate) angle: f32,
    pub(crate) hitbox: Hitbox,
    /// Per-second velocity retention factor.
    pub(crate) damping_base: f32,
    /// Cell the body is registered in.
    pub(crate) cell: CellKey,
    pub(crate) oversize_warned: bool,
    pub health: Health,
    pub kind: BodyKind,
    pub response: CollisionResponse,
    pub filter: CollisionFilter,
}

impl Body {
    pub(crate) fn from_desc(desc: BodyDesc, default_damping: f32, cell: CellKey) -> Self {
        let BodyDesc {
            mut hitbox,
            kind,
            health,
            response,
            filter,
            damping,
            angle,
            velocity,
        } = desc;
        hitbox.set_rotation(angle);
        let position = hitbox.center();
        Self {
            position,
            previous_position: position,
            velocity,
            acceleration: Vec2::ZERO,
            impulse: Vec2::ZERO,
            angle,
            hitbox,
            damping_base: damping.unwrap_or(default_damping),
            cell,
            oversize_warned: false,
            health,
            kind,
            response,
            filter,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Position before the most recent integration.
    #[inline]
    pub fn previous_position(&self) -> Vec2 {
        self.previous_position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Force accumulated since the last integration.
    #[inline]
    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn hitbox(&self) -> &Hitbox {
        &self.hitbox
    }

    #[inline]
    pub fn damping_base(&self) -> f32 {
        self.damping_base
    }

    /// Index cell the body is currently registered in.
    #[inline]
    pub fn cell(&self) -> CellKey {
        self.cell
    }

    /// Add a force, consumed by the next integration step.
    #[inline]
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Queue an instantaneous velocity change for the next integration step.
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.impulse += impulse;
    }

    /// Replace the velocity outright. Forces and impulses still queued are
    /// added on top at the next integration.
    #[inline]
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Set the facing angle. The hitbox follows at the next integration.
    #[inline]
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    pub fn set_damping(&mut self, damping_base: f32) {
        self.damping_base = damping_base;
    }

    /// Swap in a new shape. It is moved to the body's position and angle.
    pub fn set_hitbox(&mut self, mut hitbox: Hitbox) {
        hitbox.set_position(self.position);
        hitbox.set_rotation(self.angle);
        self.hitbox = hitbox;
        self.oversize_warned = false;
    }

    /// Grow or shrink the hitbox, e.g. an explosion widening its radius.
    pub fn expand_hitbox(&mut self, factor: f32) -> Result<()> {
        self.hitbox.expand(factor)?;
        self.oversize_warned = false;
        Ok(())
    }

    /// Subtract hit points. Returns the damage actually applied.
    #[inline]
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.health.take_damage(amount)
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.health.is_depleted()
    }
}

/// Construction parameters for a [`Body`]. The body starts at the hitbox
/// center.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    hitbox: Hitbox,
    kind: BodyKind,
    health: Health,
    response: CollisionResponse,
    filter: CollisionFilter,
    damping: Option<f32>,
    angle: f32,
    velocity: Vec2,
}

impl BodyDesc {
    pub fn new(hitbox: Hitbox) -> Self {
        Self {
            hitbox,
            kind: BodyKind::default(),
            health: Health::default(),
            response: CollisionResponse::default(),
            filter: CollisionFilter::default(),
            damping: None,
            angle: 0.0,
            velocity: Vec2::ZERO,
        }
    }

    /// Initial position, overriding the hitbox center.
    pub fn at(mut self, position: Vec2) -> Self {
        self.hitbox.set_position(position);
        self
    }

    pub fn kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    pub fn indestructible(mut self) -> Self {
        self.health = Health::Indestructible;
        self
    }

    pub fn response(mut self, response: CollisionResponse) -> Self {
        self.response = response;
        self
    }

    /// How much this body is displaced by contact, clamped to `[0, 1]`.
    pub fn push_resistance(mut self, value: f32) -> Self {
        self.response.set_push_resistance(value);
        self
    }

    /// How strongly this body displaces others, clamped to `[0, 1]`.
    pub fn push_strength(mut self, value: f32) -> Self {
        self.response.set_push_strength(value);
        self
    }

    pub fn ignore_body(mut self, entity: hecs::Entity) -> Self {
        self.filter.ignore_body(entity);
        self
    }

    pub fn ignore_kind(mut self, kind: BodyKind) -> Self {
        self.filter.ignore_kind(kind);
        self
    }

    pub fn no_collision(mut self, yes: bool) -> Self {
        self.filter.no_collision = yes;
        self
    }

    /// Per-second velocity retention, overriding the world default.
    pub fn damping(mut self, damping_base: f32) -> Self {
        self.damping = Some(damping_base);
        self
    }

    pub fn angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn hitbox(&self) -> &Hitbox {
        &self.hitbox
    }
}
