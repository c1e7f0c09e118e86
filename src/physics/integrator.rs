//! Body integration functions.
//!
//! The per-body update runs these in a fixed order (see
//! [`PhysicsWorld::update_position`](super::PhysicsWorld::update_position)):
//! velocity, position, hitbox sync, re-registration, then [`clear_forces`].

use glam::Vec2;

use super::body::Body;

/// Velocity retention over `dt` seconds for a per-second base.
///
/// `base.powf(dt)` keeps damping independent of the frame rate. A base of 1
/// or more disables damping.
#[inline]
pub fn damping_factor(base: f32, dt: f32) -> f32 {
    if base >= 1.0 {
        1.0
    } else {
        base.max(0.0).powf(dt)
    }
}

/// Semi-implicit Euler: `v += a * dt`, then queued impulses, then damping.
pub fn integrate_velocity(body: &mut Body, dt: f32) {
    body.velocity += body.acceleration * dt;
    body.velocity += std::mem::take(&mut body.impulse);
    body.velocity *= damping_factor(body.damping_base, dt);
}

/// `p += v * dt`.
pub fn integrate_position(body: &mut Body, dt: f32) {
    body.previous_position = body.position;
    body.position += body.velocity * dt;
}

/// Move the hitbox to the body's position and angle.
pub fn sync_hitbox(body: &mut Body) {
    body.hitbox.set_position(body.position);
    body.hitbox.set_rotation(body.angle);
}

/// Reset the force accumulator for the next frame.
pub fn clear_forces(body: &mut Body) {
    body.acceleration = Vec2::ZERO;
}
