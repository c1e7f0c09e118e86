//! Contact records reported to gameplay.

use glam::Vec2;

use super::body::BodyKind;

/// One exact overlap seen while updating `body`.
///
/// Contacts are one-sided: the pair appears a second time, mirrored, only
/// if `other` also admits `body` when its own update runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// The body being updated.
    pub body: hecs::Entity,
    pub kind: BodyKind,
    /// The body it overlaps.
    pub other: hecs::Entity,
    pub other_kind: BodyKind,
    /// Unit vector from `other` toward `body`.
    pub normal: Vec2,
}

impl Contact {
    /// Whether this contact involves `entity` on either side.
    #[inline]
    pub fn involves(&self, entity: hecs::Entity) -> bool {
        self.body == entity || self.other == entity
    }
}
