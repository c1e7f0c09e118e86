//! Debug overlay seam.
//!
//! The collision core never links a renderer. Hitboxes describe their outline
//! through this trait and the host (a window, a test recorder, a log dump)
//! decides what to do with the primitives.

use glam::Vec2;

/// Sink for hitbox outline primitives, in screen space.
pub trait DebugDraw {
    /// Draw a line segment.
    fn line(&mut self, from: Vec2, to: Vec2);

    /// Draw a circle outline.
    fn circle(&mut self, center: Vec2, radius: f32);
}

/// A recorded outline primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebugPrimitive {
    Line { from: Vec2, to: Vec2 },
    Circle { center: Vec2, radius: f32 },
}

/// [`DebugDraw`] implementation that records primitives into a list.
#[derive(Debug, Default)]
pub struct DebugRecorder {
    pub primitives: Vec<DebugPrimitive>,
}

impl DebugDraw for DebugRecorder {
    fn line(&mut self, from: Vec2, to: Vec2) {
        self.primitives.push(DebugPrimitive::Line { from, to });
    }

    fn circle(&mut self, center: Vec2, radius: f32) {
        self.primitives.push(DebugPrimitive::Circle { center, radius });
    }
}
