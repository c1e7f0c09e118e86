//! Broadphase: uniform grid mapping world positions to cells of body handles.
//!
//! A body is registered in exactly one cell, the one containing its position.
//! Neighborhood queries return every handle in a square block of cells around
//! a point. The result is a conservative superset: with a query radius of `r`
//! cells it contains every body whose hitbox can touch a hitbox at the query
//! point, provided both bounding radii are at most `r * cell_size / 2`
//! (see [`SpatialIndex::max_complete_radius`]).

use std::collections::HashMap;

use glam::Vec2;
use tracing::{trace, warn};

use crate::error::{PhysicsError, Result};

/// Integer grid coordinates of a cell.
pub type CellKey = (i32, i32);

/// Uniform spatial hash grid keyed by [`CellKey`].
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f32,
    inv_cell_size: f32,
    cells: HashMap<CellKey, Vec<hecs::Entity>>,
    len: usize,
}

impl SpatialIndex {
    /// Create an empty index. `cell_size` must be finite and positive.
    pub fn new(cell_size: f32) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "cell_size must be finite and positive, got {cell_size}"
            )));
        }
        Ok(Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            len: 0,
        })
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of registered handles.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest hitbox bounding radius for which a query of `radius_in_cells`
    /// is guaranteed to have no false negatives.
    #[inline]
    pub fn max_complete_radius(&self, radius_in_cells: i32) -> f32 {
        radius_in_cells as f32 * self.cell_size * 0.5
    }

    /// `(floor(x / cell_size), floor(y / cell_size))`.
    #[inline]
    pub fn cell_key_of(&self, position: Vec2) -> CellKey {
        (
            (position.x * self.inv_cell_size).floor() as i32,
            (position.y * self.inv_cell_size).floor() as i32,
        )
    }

    /// Register `entity` in the cell containing `position`. Returns the key.
    pub fn insert(&mut self, entity: hecs::Entity, position: Vec2) -> CellKey {
        let key = self.cell_key_of(position);
        self.insert_at(entity, key);
        key
    }

    /// Register `entity` directly under `key`.
    pub fn insert_at(&mut self, entity: hecs::Entity, key: CellKey) {
        self.cells.entry(key).or_default().push(entity);
        self.len += 1;
    }

    /// Remove `entity` from the cell under `key`.
    ///
    /// Removing a handle that is not in that cell is logged and ignored.
    /// Returns whether a handle was removed.
    pub fn remove(&mut self, entity: hecs::Entity, key: CellKey) -> bool {
        let Some(cell) = self.cells.get_mut(&key) else {
            warn!(?entity, ?key, "remove from empty cell ignored");
            return false;
        };
        let Some(slot) = cell.iter().position(|e| *e == entity) else {
            warn!(?entity, ?key, "remove of unregistered body ignored");
            return false;
        };
        cell.swap_remove(slot);
        if cell.is_empty() {
            self.cells.remove(&key);
        }
        self.len -= 1;
        true
    }

    /// Move `entity` from `old` to `new`. No-op when the keys are equal.
    ///
    /// Returns whether the body changed cells.
    pub fn rehome(&mut self, entity: hecs::Entity, old: CellKey, new: CellKey) -> bool {
        if old == new {
            return false;
        }
        trace!(?entity, ?old, ?new, "rehome");
        self.remove(entity, old);
        self.insert_at(entity, new);
        true
    }

    /// Handles registered under `key`. Missing cells are empty.
    #[inline]
    pub fn cell(&self, key: CellKey) -> &[hecs::Entity] {
        self.cells.get(&key).map_or(&[][..], Vec::as_slice)
    }

    /// Every handle in the `(2r + 1) x (2r + 1)` block of cells centered on
    /// the cell containing `position`, visited in a fixed cell order.
    ///
    /// A block with more cells than are occupied is answered from the
    /// occupied cells instead, so the cost never exceeds one pass over the
    /// index. Both paths visit cells in the same order.
    pub fn query_neighborhood(
        &self,
        position: Vec2,
        radius_in_cells: i32,
    ) -> impl Iterator<Item = hecs::Entity> + '_ {
        let (cx, cy) = self.cell_key_of(position);
        let r = i64::from(radius_in_cells.max(0));
        let clamp = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        let (x0, x1) = (clamp(i64::from(cx) - r), clamp(i64::from(cx) + r));
        let (y0, y1) = (clamp(i64::from(cy) - r), clamp(i64::from(cy) + r));

        let width = (i64::from(x1) - i64::from(x0) + 1) as u64;
        let height = (i64::from(y1) - i64::from(y0) + 1) as u64;
        let dense = width.saturating_mul(height) <= self.cells.len() as u64;

        let block = dense.then(|| {
            (x0..=x1).flat_map(move |i| (y0..=y1).map(move |j| (i, j)))
        });
        let sparse = (!dense).then(|| {
            let mut keys: Vec<CellKey> = self
                .cells
                .keys()
                .filter(|(i, j)| (x0..=x1).contains(i) && (y0..=y1).contains(j))
                .copied()
                .collect();
            // Lexicographic order matches the block walk.
            keys.sort_unstable();
            keys
        });

        block
            .into_iter()
            .flatten()
            .chain(sparse.into_iter().flatten())
            .flat_map(move |key| self.cell(key).iter().copied())
    }

    /// Neighborhood wide enough to cover a circle of `radius` around
    /// `position`, plus one cell of slack for bodies straddling the border.
    pub fn query_radius(
        &self,
        position: Vec2,
        radius: f32,
    ) -> impl Iterator<Item = hecs::Entity> + '_ {
        self.query_neighborhood(position, self.cells_for(radius).saturating_add(1))
    }

    /// Cell radius covering `radius` world units. Saturates for huge or
    /// infinite radii; NaN counts as zero.
    pub fn cells_for(&self, radius: f32) -> i32 {
        (radius.max(0.0) * self.inv_cell_size).ceil() as i32
    }

    /// Whether `entity` is registered under `key`.
    pub fn contains(&self, entity: hecs::Entity, key: CellKey) -> bool {
        self.cell(key).contains(&entity)
    }

    /// Iterate all non-empty cells. Order is unspecified.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &[hecs::Entity])> {
        self.cells.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Number of cells holding at least one handle.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: usize) -> (hecs::World, Vec<hecs::Entity>) {
        let mut world = hecs::World::new();
        let ids = (0..n).map(|i| world.spawn((i,))).collect();
        (world, ids)
    }

    #[test]
    fn test_cell_key_floor() {
        let index = SpatialIndex::new(10.0).unwrap();
        assert_eq!(index.cell_key_of(Vec2::new(0.0, 0.0)), (0, 0));
        assert_eq!(index.cell_key_of(Vec2::new(9.99, 19.5)), (0, 1));
        assert_eq!(index.cell_key_of(Vec2::new(-0.1, -10.0)), (-1, -1));
        assert_eq!(index.cell_key_of(Vec2::new(-10.1, 35.0)), (-2, 3));
    }

    #[test]
    fn test_invalid_cell_size() {
        assert!(SpatialIndex::new(0.0).is_err());
        assert!(SpatialIndex::new(-4.0).is_err());
        assert!(SpatialIndex::new(f32::INFINITY).is_err());
    }

    #[test]
    fn test_insert_remove() {
        let (_world, ids) = entities(3);
        let mut index = SpatialIndex::new(10.0).unwrap();
        let k0 = index.insert(ids[0], Vec2::new(1.0, 1.0));
        let k1 = index.insert(ids[1], Vec2::new(2.0, 2.0));
        index.insert(ids[2], Vec2::new(55.0, 1.0));
        assert_eq!(k0, k1);
        assert_eq!(index.len(), 3);
        assert_eq!(index.cell(k0), &[ids[0], ids[1]]);

        assert!(index.remove(ids[0], k0));
        assert_eq!(index.cell(k0), &[ids[1]]);
        assert_eq!(index.len(), 2);

        // Double removal is tolerated.
        assert!(!index.remove(ids[0], k0));
        assert!(!index.remove(ids[0], (99, 99)));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_empty_cell_dropped() {
        let (_world, ids) = entities(1);
        let mut index = SpatialIndex::new(10.0).unwrap();
        let key = index.insert(ids[0], Vec2::ZERO);
        assert_eq!(index.occupied_cells(), 1);
        index.remove(ids[0], key);
        assert_eq!(index.occupied_cells(), 0);
        assert!(index.cell(key).is_empty());
    }

    #[test]
    fn test_rehome() {
        let (_world, ids) = entities(1);
        let mut index = SpatialIndex::new(10.0).unwrap();
        let old = index.insert(ids[0], Vec2::new(5.0, 5.0));

        assert!(!index.rehome(ids[0], old, old));
        assert_eq!(index.cell(old), &[ids[0]]);

        let new = index.cell_key_of(Vec2::new(15.0, 5.0));
        assert!(index.rehome(ids[0], old, new));
        assert!(index.cell(old).is_empty());
        assert_eq!(index.cell(new), &[ids[0]]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_query_neighborhood_block() {
        let (_world, ids) = entities(4);
        let mut index = SpatialIndex::new(10.0).unwrap();
        index.insert(ids[0], Vec2::new(5.0, 5.0));
        index.insert(ids[1], Vec2::new(-5.0, 15.0)); // diagonal neighbor
        index.insert(ids[2], Vec2::new(25.0, 5.0)); // two cells away
        index.insert(ids[3], Vec2::new(15.0, -5.0)); // diagonal neighbor

        let mut found: Vec<_> = index.query_neighborhood(Vec2::new(5.0, 5.0), 1).collect();
        found.sort();
        let mut expected = vec![ids[0], ids[1], ids[3]];
        expected.sort();
        assert_eq!(found, expected);

        assert_eq!(index.query_neighborhood(Vec2::new(5.0, 5.0), 2).count(), 4);
        assert_eq!(index.query_neighborhood(Vec2::new(5.0, 5.0), 0).count(), 1);
    }

    #[test]
    fn test_query_missing_cells_empty() {
        let index = SpatialIndex::new(10.0).unwrap();
        assert_eq!(index.query_neighborhood(Vec2::new(1e6, -1e6), 1).count(), 0);
    }

    #[test]
    fn test_query_radius_covers_distance() {
        let (_world, ids) = entities(2);
        let mut index = SpatialIndex::new(10.0).unwrap();
        index.insert(ids[0], Vec2::new(0.0, 0.0));
        index.insert(ids[1], Vec2::new(38.0, 0.0));
        assert!(index.query_radius(Vec2::ZERO, 40.0).any(|e| e == ids[1]));
    }

    #[test]
    fn test_query_radius_huge() {
        let (_world, ids) = entities(3);
        let mut index = SpatialIndex::new(10.0).unwrap();
        index.insert(ids[0], Vec2::ZERO);
        index.insert(ids[1], Vec2::new(5e5, -3e5));
        index.insert(ids[2], Vec2::new(1e30, 1e30));

        assert_eq!(index.cells_for(f32::MAX), i32::MAX);
        assert_eq!(index.cells_for(f32::INFINITY), i32::MAX);
        assert_eq!(index.cells_for(f32::NAN), 0);
        assert_eq!(index.query_radius(Vec2::ZERO, f32::MAX).count(), 3);
        assert_eq!(index.query_radius(Vec2::ZERO, 1e6).count(), 2);
        // The far corner cell saturates to `i32::MAX` and the block clamps.
        let corner: Vec<_> = index.query_neighborhood(Vec2::new(1e30, 1e30), i32::MAX).collect();
        assert_eq!(corner, vec![ids[0], ids[2]]);
    }

    #[test]
    fn test_sparse_and_dense_walks_agree() {
        let (_world, ids) = entities(70);
        let (near, filler) = ids.split_at(40);
        let mut dense = SpatialIndex::new(10.0).unwrap();
        let mut sparse = SpatialIndex::new(10.0).unwrap();
        for (i, e) in near.iter().enumerate() {
            let p = Vec2::new((i % 5) as f32 * 4.0 - 10.0, (i / 5) as f32 * 3.0 - 10.0);
            dense.insert(*e, p);
            sparse.insert(*e, p);
        }
        // Filler far away keeps a 5x5 block on the dense path.
        for (i, e) in filler.iter().enumerate() {
            dense.insert(*e, Vec2::new(1e4 + i as f32 * 10.0, 0.0));
        }
        assert!(dense.occupied_cells() >= 25);
        assert!(sparse.occupied_cells() < 25);

        let a: Vec<_> = dense.query_neighborhood(Vec2::ZERO, 2).collect();
        let b: Vec<_> = sparse.query_neighborhood(Vec2::ZERO, 2).collect();
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }
}
