//! Spellcore 2D collision and movement core
//!
//! Broadphase spatial hashing, exact narrowphase tests, and a force-based
//! movement integrator for many independently moving bodies.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **physics::hitbox** - Circle, rectangle, and convex polygon shapes with exact overlap tests
//! 2. **physics::narrowphase** - Circle distance, AABB, and separating-axis primitives
//! 3. **physics::broadphase** - Uniform grid spatial index
//! 4. **physics::body** - Bodies, health, and construction parameters
//! 5. **physics::response** - Push resistance / push strength and ignore rules
//! 6. **physics::integrator** - Semi-implicit Euler with frame-rate independent damping
//! 7. **physics** - `PhysicsWorld`, the scene-owned frame pass
//! 8. **debug** - Outline drawing seam for debug overlays

pub mod debug;
pub mod error;
pub mod physics;

// Re-export commonly used types
pub use debug::{DebugDraw, DebugPrimitive, DebugRecorder};
pub use error::{PhysicsError, Result};
pub use physics::body::{Body, BodyDesc, BodyKind, Health};
pub use physics::broadphase::{CellKey, SpatialIndex};
pub use physics::commands::Commands;
pub use physics::contact::Contact;
pub use physics::hitbox::{Hitbox, Shape};
pub use physics::response::{CollisionFilter, CollisionResponse};
pub use physics::{PhysicsConfig, PhysicsWorld};

// Re-export glam and hecs for convenience
pub use glam;
pub use hecs;
