//! Collision-response policy: who reacts to whom, and how hard.
//!
//! Each body carries two independent scalars in `[0, 1]`:
//!
//! - **push resistance** scales how much *this* body is displaced by contact
//!   (0 = immovable, 1 = full response)
//! - **push strength** scales how strongly *this* body displaces others
//!   (0 = others pass through freely, 1 = full push)
//!
//! The force on a body from one contact is
//! `normal * push_force * self.push_resistance * other.push_strength`,
//! with `normal` the unit vector from the other body toward this one.

use std::collections::HashSet;

use glam::Vec2;

use super::body::BodyKind;

/// Per-body response scalars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResponse {
    push_resistance: f32,
    push_strength: f32,
}

impl Default for CollisionResponse {
    fn default() -> Self {
        Self::RIGID
    }
}

impl CollisionResponse {
    /// Full response in both directions.
    pub const RIGID: Self = Self {
        push_resistance: 1.0,
        push_strength: 1.0,
    };

    /// Pushes others but is never displaced (walls, constructs).
    pub const IMMOVABLE: Self = Self {
        push_resistance: 0.0,
        push_strength: 1.0,
    };

    /// Detected by others but never pushes or gets pushed.
    pub const GHOST: Self = Self {
        push_resistance: 0.0,
        push_strength: 0.0,
    };

    /// Both scalars are clamped to `[0, 1]`. NaN is treated as 0.
    pub fn new(push_resistance: f32, push_strength: f32) -> Self {
        Self {
            push_resistance: unit(push_resistance),
            push_strength: unit(push_strength),
        }
    }

    #[inline]
    pub fn push_resistance(&self) -> f32 {
        self.push_resistance
    }

    #[inline]
    pub fn push_strength(&self) -> f32 {
        self.push_strength
    }

    pub fn set_push_resistance(&mut self, value: f32) {
        self.push_resistance = unit(value);
    }

    pub fn set_push_strength(&mut self, value: f32) {
        self.push_strength = unit(value);
    }
}

#[inline]
fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Pre-filter applied before the exact overlap test.
///
/// Ignore rules are one-sided: a projectile that ignores its launcher is not
/// pushed by it, but the launcher still sees the projectile unless it opts
/// out as well.
#[derive(Debug, Clone, Default)]
pub struct CollisionFilter {
    /// Skip all contact processing for this body.
    pub no_collision: bool,
    ignore_bodies: HashSet<hecs::Entity>,
    ignore_kinds: HashSet<BodyKind>,
}

impl CollisionFilter {
    pub fn ignore_body(&mut self, entity: hecs::Entity) {
        self.ignore_bodies.insert(entity);
    }

    pub fn ignore_kind(&mut self, kind: BodyKind) {
        self.ignore_kinds.insert(kind);
    }

    /// Replace the per-instance ignore set.
    pub fn set_ignored_bodies(&mut self, entities: impl IntoIterator<Item = hecs::Entity>) {
        self.ignore_bodies = entities.into_iter().collect();
    }

    /// Replace the per-kind ignore set.
    pub fn set_ignored_kinds(&mut self, kinds: impl IntoIterator<Item = BodyKind>) {
        self.ignore_kinds = kinds.into_iter().collect();
    }

    pub fn ignores_body(&self, entity: hecs::Entity) -> bool {
        self.ignore_bodies.contains(&entity)
    }

    pub fn ignores_kind(&self, kind: BodyKind) -> bool {
        self.ignore_kinds.contains(&kind)
    }

    /// Whether a candidate survives the pre-filter.
    #[inline]
    pub fn admits(&self, other: hecs::Entity, other_kind: BodyKind) -> bool {
        !self.no_collision && !self.ignores_kind(other_kind) && !self.ignores_body(other)
    }
}

/// Unit vector from `other_position` toward `position`.
///
/// Coincident centers fall back to `+X` for the body with the lower handle
/// bits and `-X` for the other, so the pair still separates and no NaN is
/// produced.
pub fn contact_normal(
    position: Vec2,
    other_position: Vec2,
    entity: hecs::Entity,
    other: hecs::Entity,
) -> Vec2 {
    let normal = (position - other_position).normalize_or_zero();
    if normal != Vec2::ZERO {
        normal
    } else if entity.to_bits() < other.to_bits() {
        Vec2::X
    } else {
        Vec2::NEG_X
    }
}

/// Force applied to a body with response `this` by a contact with `other`.
#[inline]
pub fn contact_force(
    normal: Vec2,
    this: &CollisionResponse,
    other: &CollisionResponse,
    push_force: f32,
) -> Vec2 {
    normal * (push_force * this.push_resistance * other.push_strength)
}
