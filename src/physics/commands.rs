//! Deferred structural changes.
//!
//! Contact callbacks run while the world is iterating its bodies, so they
//! cannot spawn or despawn directly. They queue the change here instead and
//! the world applies the queue after the pass: despawns first, then spawns,
//! each in submission order.

use super::body::BodyDesc;

/// Queue of spawns and despawns applied at the end of a pass.
#[derive(Debug, Default)]
pub struct Commands {
    pub(crate) spawns: Vec<BodyDesc>,
    pub(crate) despawns: Vec<hecs::Entity>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a body after the current pass.
    pub fn spawn(&mut self, desc: BodyDesc) {
        self.spawns.push(desc);
    }

    /// Despawn a body after the current pass. Queuing the same body twice,
    /// or a body that is already gone, is harmless.
    pub fn despawn(&mut self, entity: hecs::Entity) {
        self.despawns.push(entity);
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty() && self.despawns.is_empty()
    }

    /// Pending despawns, in submission order.
    pub fn pending_despawns(&self) -> &[hecs::Entity] {
        &self.despawns
    }

    pub fn pending_spawns(&self) -> usize {
        self.spawns.len()
    }

    pub fn clear(&mut self) {
        self.spawns.clear();
        self.despawns.clear();
    }
}
