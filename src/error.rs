//! Error types for the collision core.

use thiserror::Error;

/// Errors produced by hitbox construction, configuration, and body lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// SAT is undefined below a triangle.
    #[error("polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),

    #[error("polygon vertices do not form a convex outline")]
    NonConvexPolygon,

    #[error("hitbox geometry contains a non-finite or non-positive value")]
    NonFiniteGeometry,

    #[error("invalid hitbox scale factor {0}")]
    InvalidScale(f32),

    #[error("invalid physics config: {0}")]
    InvalidConfig(String),

    #[error("entity {0:?} is not a live body")]
    UnknownBody(hecs::Entity),

    /// The `Body` component itself can only change through the world.
    #[error("cannot attach or detach the Body component of {0:?}")]
    BodyComponent(hecs::Entity),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
