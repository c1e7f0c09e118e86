//! Positioned, rotatable 2D collision shapes.
//!
//! A [`Hitbox`] stores its center separately from the shape's local-space
//! geometry. Rectangles and polygons keep their un-rotated local offsets in
//! [`Shape`] plus a rotated copy that is rebuilt on every rotation or
//! extent change, so the cache is never stale when read.
//!
//! # Pair matrix
//!
//! | Pair | Test | Exact |
//! |------|------|-------|
//! | Circle x Circle | center distance | yes |
//! | Circle x Rect | SAT (edge normals + nearest-vertex axis) | yes |
//! | Circle x Polygon | SAT (edge normals + nearest-vertex axis) | yes |
//! | Rect x Rect, both unrotated | AABB | yes |
//! | Rect x Rect (rotated), Rect x Polygon, Polygon x Polygon | SAT | yes |
//!
//! Every pair is first rejected by a bounding-circle check. That check is a
//! conservative approximation and never accepts a pair on its own.

use glam::Vec2;

use crate::debug::DebugDraw;
use crate::error::{PhysicsError, Result};

use super::narrowphase;

/// Slack added to the bounding-circle early-out so touching rect/polygon
/// pairs are never rejected by rounding.
const BOUNDS_EPSILON: f32 = 1e-4;

/// Collision shape geometry in local space (relative to the hitbox center).
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    /// Rectangle given by half-extents. Rotates as an oriented box.
    Rect { half_extents: Vec2 },
    /// Convex polygon, vertex offsets from center, un-rotated.
    Polygon { vertices: Vec<Vec2> },
}

/// A 2D collision shape placed in the world.
#[derive(Debug, Clone)]
pub struct Hitbox {
    center: Vec2,
    rotation: f32,
    shape: Shape,
    /// Rect corners or polygon vertices rotated by `rotation`. Empty for circles.
    rotated: Vec<Vec2>,
    bounding_radius: f32,
}

impl Hitbox {
    /// Create a circle. `radius` must be finite and positive.
    pub fn circle(center: Vec2, radius: f32) -> Result<Self> {
        check_extent(radius)?;
        Ok(Self::from_shape(center, Shape::Circle { radius }))
    }

    /// Create an axis-aligned rectangle of the given full width and height.
    pub fn rect(center: Vec2, width: f32, height: f32) -> Result<Self> {
        check_extent(width)?;
        check_extent(height)?;
        Ok(Self::from_shape(
            center,
            Shape::Rect {
                half_extents: Vec2::new(width, height) * 0.5,
            },
        ))
    }

    /// Create a convex polygon from vertex offsets relative to `center`.
    ///
    /// Vertices may be wound either way. Fewer than three vertices, non-finite
    /// coordinates, or a non-convex outline are rejected.
    pub fn polygon(center: Vec2, vertices: Vec<Vec2>) -> Result<Self> {
        validate_polygon(&vertices)?;
        Ok(Self::from_shape(center, Shape::Polygon { vertices }))
    }

    /// A rectangle stored as an explicit four-vertex polygon.
    pub fn rect_polygon(center: Vec2, width: f32, height: f32) -> Result<Self> {
        check_extent(width)?;
        check_extent(height)?;
        let h = Vec2::new(width, height) * 0.5;
        Ok(Self::from_shape(
            center,
            Shape::Polygon {
                vertices: rect_corners(h).to_vec(),
            },
        ))
    }

    /// A regular `sides`-gon inscribed in a circle of `radius`.
    pub fn regular_polygon(center: Vec2, radius: f32, sides: usize) -> Result<Self> {
        if sides < 3 {
            return Err(PhysicsError::DegeneratePolygon(sides));
        }
        let step = std::f32::consts::TAU / sides as f32;
        let vertices = (0..sides)
            .map(|i| Vec2::from_angle(step * i as f32) * radius)
            .collect();
        Self::polygon(center, vertices)
    }

    /// Builder-style rotation, see [`Hitbox::set_rotation`].
    pub fn with_rotation(mut self, angle: f32) -> Self {
        self.set_rotation(angle);
        self
    }

    fn from_shape(center: Vec2, shape: Shape) -> Self {
        let mut hitbox = Self {
            center,
            rotation: 0.0,
            shape,
            rotated: Vec::new(),
            bounding_radius: 0.0,
        };
        hitbox.rebuild_cache();
        hitbox
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Rotation in radians.
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Rotated local-space vertices (rect corners or polygon vertices).
    /// Empty for circles.
    #[inline]
    pub fn local_vertices(&self) -> &[Vec2] {
        &self.rotated
    }

    /// World-space vertices.
    pub fn world_vertices(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.rotated.iter().map(move |v| self.center + *v)
    }

    /// Largest distance from the center to any point of the shape.
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    /// Width and height of the shape's axis-aligned bounds at the current rotation.
    pub fn size(&self) -> Vec2 {
        match &self.shape {
            Shape::Circle { radius } => Vec2::splat(radius * 2.0),
            Shape::Rect { .. } | Shape::Polygon { .. } => {
                let (min, max) = self
                    .rotated
                    .iter()
                    .fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, hi), v| {
                        (lo.min(*v), hi.max(*v))
                    });
                max - min
            }
        }
    }

    /// Move the shape. Vertex data is stored relative to the center and is
    /// not touched.
    #[inline]
    pub fn set_position(&mut self, center: Vec2) {
        self.center = center;
    }

    /// Rotate the shape to `angle` radians (counter-clockwise).
    ///
    /// Rebuilds the rotated vertex cache for rects and polygons. Setting the
    /// current angle again is a no-op.
    pub fn set_rotation(&mut self, angle: f32) {
        if angle == self.rotation {
            return;
        }
        self.rotation = angle;
        self.rebuild_cache();
    }

    /// Uniformly scale the shape's extent by `factor`.
    pub fn expand(&mut self, factor: f32) -> Result<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(PhysicsError::InvalidScale(factor));
        }
        match &mut self.shape {
            Shape::Circle { radius } => *radius *= factor,
            Shape::Rect { half_extents } => *half_extents *= factor,
            Shape::Polygon { vertices } => {
                for v in vertices.iter_mut() {
                    *v *= factor;
                }
            }
        }
        self.rebuild_cache();
        Ok(())
    }

    /// Shift the local vertices by `offset` without moving the center.
    ///
    /// A rectangle becomes a polygon, since its corners are no longer
    /// symmetric about the center. Circles have no vertices and are left as is.
    pub fn offset_vertices(&mut self, offset: Vec2) {
        let vertices = match &self.shape {
            Shape::Circle { .. } => return,
            Shape::Rect { half_extents } => rect_corners(*half_extents).to_vec(),
            Shape::Polygon { vertices } => vertices.clone(),
        };
        self.shape = Shape::Polygon {
            vertices: vertices.into_iter().map(|v| v + offset).collect(),
        };
        self.rebuild_cache();
    }

    /// Conservative bounding-circle check. `false` means the shapes cannot
    /// overlap; `true` means they might.
    #[inline]
    pub fn may_overlap(&self, other: &Hitbox) -> bool {
        let reach = self.bounding_radius + other.bounding_radius + BOUNDS_EPSILON;
        self.center.distance_squared(other.center) <= reach * reach
    }

    /// Exact overlap test. Symmetric: `a.is_colliding(b) == b.is_colliding(a)`.
    pub fn is_colliding(&self, other: &Hitbox) -> bool {
        if !self.may_overlap(other) {
            return false;
        }

        match (&self.shape, &other.shape) {
            (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
                narrowphase::circle_circle(self.center, *ra, other.center, *rb)
            }
            (Shape::Circle { radius }, Shape::Rect { .. } | Shape::Polygon { .. }) => {
                narrowphase::circle_polygon(self.center, *radius, other.center, &other.rotated)
            }
            (Shape::Rect { .. } | Shape::Polygon { .. }, Shape::Circle { radius }) => {
                narrowphase::circle_polygon(other.center, *radius, self.center, &self.rotated)
            }
            (Shape::Rect { half_extents: ha }, Shape::Rect { half_extents: hb })
                if self.rotation == 0.0 && other.rotation == 0.0 =>
            {
                narrowphase::aabb_aabb(self.center, *ha, other.center, *hb)
            }
            (
                Shape::Rect { .. } | Shape::Polygon { .. },
                Shape::Rect { .. } | Shape::Polygon { .. },
            ) => narrowphase::polygon_polygon(
                self.center,
                &self.rotated,
                other.center,
                &other.rotated,
            ),
        }
    }

    /// Emit the outline for a debug overlay, offset by `camera`.
    pub fn draw(&self, target: &mut impl DebugDraw, camera: Vec2) {
        let origin = self.center - camera;
        match &self.shape {
            Shape::Circle { radius } => target.circle(origin, *radius),
            Shape::Rect { .. } | Shape::Polygon { .. } => {
                let n = self.rotated.len();
                for i in 0..n {
                    target.line(origin + self.rotated[i], origin + self.rotated[(i + 1) % n]);
                }
            }
        }
    }

    fn rebuild_cache(&mut self) {
        let rot = Vec2::from_angle(self.rotation);
        self.rotated.clear();
        match &self.shape {
            Shape::Circle { radius } => {
                self.bounding_radius = *radius;
                return;
            }
            Shape::Rect { half_extents } => {
                self.rotated
                    .extend(rect_corners(*half_extents).into_iter().map(|v| rot.rotate(v)));
            }
            Shape::Polygon { vertices } => {
                self.rotated.extend(vertices.iter().map(|v| rot.rotate(*v)));
            }
        }
        self.bounding_radius = self
            .rotated
            .iter()
            .map(|v| v.length())
            .fold(0.0, f32::max);
    }
}

fn check_extent(value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::NonFiniteGeometry)
    }
}

fn rect_corners(h: Vec2) -> [Vec2; 4] {
    [
        Vec2::new(-h.x, -h.y),
        Vec2::new(h.x, -h.y),
        Vec2::new(h.x, h.y),
        Vec2::new(-h.x, h.y),
    ]
}

/// Reject outlines SAT cannot handle.
///
/// Convex and simple means every turn has the same sign and the turns add up
/// to exactly one full revolution (a pentagram turns the same way at every
/// vertex but winds twice).
fn validate_polygon(vertices: &[Vec2]) -> Result<()> {
    let n = vertices.len();
    if n < 3 {
        return Err(PhysicsError::DegeneratePolygon(n));
    }
    if vertices.iter().any(|v| !v.is_finite()) {
        return Err(PhysicsError::NonFiniteGeometry);
    }

    let mut sign = 0.0f32;
    let mut winding = 0.0f32;
    for i in 0..n {
        let a = vertices[(i + 1) % n] - vertices[i];
        let b = vertices[(i + 2) % n] - vertices[(i + 1) % n];
        let cross = a.perp_dot(b);
        // Collinear within rounding, relative to the edge lengths.
        let tolerance = f32::EPSILON * a.length() * b.length();
        if cross.abs() > tolerance {
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return Err(PhysicsError::NonConvexPolygon);
            }
        }
        winding += cross.atan2(a.dot(b));
    }

    if sign == 0.0 || (winding.abs() - std::f32::consts::TAU).abs() > 1e-3 {
        return Err(PhysicsError::NonConvexPolygon);
    }
    Ok(())
}
