//! Narrowphase collision tests: circle distance, AABB overlap, and SAT.
//!
//! Every function here is a pure boolean test over world-space data. Polygon
//! inputs are the *rotated local* vertex offsets of a hitbox plus its center,
//! so translation never touches vertex data.
//!
//! Overlap conventions:
//! - pairs involving a circle are strict (`distance < r1 + r2`, touching is a miss)
//! - rect/polygon pairs use closed intervals (touching counts as a hit)

use glam::Vec2;

/// 1D projection of a shape onto an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Closed-interval overlap.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Open-interval overlap.
    #[inline]
    pub fn overlaps_strict(&self, other: &Interval) -> bool {
        self.min < other.max && other.min < self.max
    }
}

/// Project a polygon (center + local offsets) onto `axis`.
#[inline]
pub fn project_polygon(center: Vec2, local: &[Vec2], axis: Vec2) -> Interval {
    let base = center.dot(axis);
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for v in local {
        let d = base + v.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    Interval { min, max }
}

/// Project a circle onto a unit-length `axis`.
#[inline]
pub fn project_circle(center: Vec2, radius: f32, axis: Vec2) -> Interval {
    let c = center.dot(axis);
    Interval {
        min: c - radius,
        max: c + radius,
    }
}

/// Circle-circle test: `distance(centers) < r1 + r2`.
#[inline]
pub fn circle_circle(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> bool {
    let min_dist = radius_a + radius_b;
    center_a.distance_squared(center_b) < min_dist * min_dist
}

/// Axis-aligned box test for two unrotated rectangles.
#[inline]
pub fn aabb_aabb(center_a: Vec2, half_a: Vec2, center_b: Vec2, half_b: Vec2) -> bool {
    let d = (center_b - center_a).abs();
    let reach = half_a + half_b;
    d.x <= reach.x && d.y <= reach.y
}

/// Separating Axis Theorem for two convex polygons.
///
/// Every edge normal of both polygons is a candidate axis. Axes are left
/// unnormalized: the boolean answer does not depend on axis length, and a
/// zero-length edge degenerates to an axis on which everything overlaps.
pub fn polygon_polygon(center_a: Vec2, local_a: &[Vec2], center_b: Vec2, local_b: &[Vec2]) -> bool {
    for local in [local_a, local_b] {
        for axis in edge_normals(local) {
            let proj_a = project_polygon(center_a, local_a, axis);
            let proj_b = project_polygon(center_b, local_b, axis);
            if !proj_a.overlaps(&proj_b) {
                return false;
            }
        }
    }
    true
}

/// Exact circle vs convex polygon via SAT.
///
/// Candidate axes are the polygon's edge normals plus the axis from the
/// circle center toward the nearest polygon vertex. The circle's support
/// interval is `[c - r, c + r]` on a unit axis, so axes are normalized here.
pub fn circle_polygon(center: Vec2, radius: f32, poly_center: Vec2, local: &[Vec2]) -> bool {
    for axis in edge_normals(local) {
        let axis = axis.normalize_or_zero();
        if axis == Vec2::ZERO {
            continue;
        }
        if separated_on(axis, center, radius, poly_center, local) {
            return false;
        }
    }

    let nearest = local
        .iter()
        .map(|v| poly_center + *v)
        .min_by(|a, b| {
            a.distance_squared(center)
                .total_cmp(&b.distance_squared(center))
        });

    if let Some(nearest) = nearest {
        let axis = (nearest - center).normalize_or_zero();
        if axis != Vec2::ZERO && separated_on(axis, center, radius, poly_center, local) {
            return false;
        }
    }

    true
}

#[inline]
fn separated_on(axis: Vec2, center: Vec2, radius: f32, poly_center: Vec2, local: &[Vec2]) -> bool {
    let poly = project_polygon(poly_center, local, axis);
    let circle = project_circle(center, radius, axis);
    !poly.overlaps_strict(&circle)
}

/// Perpendicular of every edge `v[i] -> v[i + 1]` (wrapping).
#[inline]
fn edge_normals(local: &[Vec2]) -> impl Iterator<Item = Vec2> + '_ {
    let n = local.len();
    (0..n).map(move |i| {
        let edge = local[(i + 1) % n] - local[i];
        edge.perp()
    })
}
