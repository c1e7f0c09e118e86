//! 2D collision and movement core.
//!
//! # Architecture
//!
//! Every pass updates each body once, in registration order:
//!
//! 1. Gather neighbors from the spatial index (broadphase)
//! 2. Filter by ignore rules, then exact overlap test (narrowphase)
//! 3. Accumulate a repulsion force per contact (response policy)
//! 4. Integrate velocity (force, queued impulses, damping)
//! 5. Integrate position and sync the hitbox
//! 6. Re-register in the index if the body crossed a cell boundary
//! 7. Clear the force accumulator
//!
//! Spawns and despawns requested during a pass are queued in [`Commands`]
//! and applied once the pass completes.

pub mod body;
pub mod broadphase;
pub mod commands;
pub mod contact;
pub mod hitbox;
pub mod integrator;
pub mod narrowphase;
pub mod response;

use std::any::TypeId;

use glam::Vec2;
use tracing::{debug, trace, warn};

use crate::debug::DebugDraw;
use crate::error::{PhysicsError, Result};

use self::body::{Body, BodyDesc};
use self::broadphase::SpatialIndex;
use self::commands::Commands;
use self::contact::Contact;
use self::hitbox::Hitbox;
use self::response::{contact_force, contact_normal};

/// Configuration for the physics simulation.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// World units per spatial index cell. Default: 128.
    pub cell_size: f32,
    /// Neighborhood radius in cells for the per-body query. Default: 1 (3x3).
    ///
    /// Hitboxes with a bounding radius above
    /// `neighborhood_cells * cell_size / 2` may miss contacts.
    pub neighborhood_cells: i32,
    /// Contact repulsion constant. Default: 6000.
    pub push_force: f32,
    /// Default per-second velocity retention. Default: 0.004. 1.0 disables damping.
    pub damping_base: f32,
    /// Fixed timestep for [`PhysicsWorld::advance`] in seconds. Default: 1/60.
    pub fixed_timestep: f64,
    /// Maximum number of passes per [`PhysicsWorld::advance`] call. Default: 4.
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            cell_size: 128.0,
            neighborhood_cells: 1,
            push_force: 6000.0,
            damping_base: 0.004,
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
        }
    }
}

impl PhysicsConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the index cell size.
    pub fn cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the neighborhood radius in cells.
    pub fn neighborhood_cells(mut self, cells: i32) -> Self {
        self.neighborhood_cells = cells;
        self
    }

    /// Set the contact repulsion constant.
    pub fn push_force(mut self, push_force: f32) -> Self {
        self.push_force = push_force;
        self
    }

    /// Set the default damping base.
    pub fn damping_base(mut self, damping_base: f32) -> Self {
        self.damping_base = damping_base;
        self
    }

    /// Set the fixed timestep used by `advance`.
    pub fn fixed_timestep(mut self, fixed_timestep: f64) -> Self {
        self.fixed_timestep = fixed_timestep;
        self
    }

    /// Set the substep cap used by `advance`.
    pub fn max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "cell_size must be finite and positive, got {}",
                self.cell_size
            )));
        }
        if self.neighborhood_cells < 1 {
            return Err(PhysicsError::InvalidConfig(format!(
                "neighborhood_cells must be at least 1, got {}",
                self.neighborhood_cells
            )));
        }
        if !self.push_force.is_finite() || self.push_force < 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "push_force must be finite and non-negative, got {}",
                self.push_force
            )));
        }
        if !self.damping_base.is_finite() || self.damping_base < 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "damping_base must be finite and non-negative, got {}",
                self.damping_base
            )));
        }
        if !self.fixed_timestep.is_finite() || self.fixed_timestep <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "fixed_timestep must be finite and positive, got {}",
                self.fixed_timestep
            )));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::InvalidConfig(
                "max_substeps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scene-owned body table, spatial index, and per-frame update.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    accumulator: f64,
    world: hecs::World,
    index: SpatialIndex,
    /// Live bodies in registration order.
    order: Vec<hecs::Entity>,
    contacts: Vec<Contact>,
    commands: Commands,
    last_spawned: Vec<hecs::Entity>,
    frame: u64,
}

impl PhysicsWorld {
    /// Create an empty world. Fails if the config does not validate.
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        let index = SpatialIndex::new(config.cell_size)?;
        Ok(Self {
            config,
            accumulator: 0.0,
            world: hecs::World::new(),
            index,
            order: Vec::new(),
            contacts: Vec::new(),
            commands: Commands::new(),
            last_spawned: Vec::new(),
            frame: 0,
        })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Underlying entity store, for querying components attached with
    /// [`PhysicsWorld::attach`].
    pub fn ecs(&self) -> &hecs::World {
        &self.world
    }

    /// Number of completed passes.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, entity: hecs::Entity) -> bool {
        self.world.get::<&Body>(entity).is_ok()
    }

    /// Live bodies in registration order.
    pub fn bodies(&self) -> impl Iterator<Item = hecs::Entity> + '_ {
        self.order.iter().copied()
    }

    /// Contacts from the most recent pass.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Bodies spawned through [`Commands`] at the end of the most recent pass.
    pub fn last_spawned(&self) -> &[hecs::Entity] {
        &self.last_spawned
    }

    /// Create a body and register it in the index cell of its position.
    pub fn spawn(&mut self, desc: BodyDesc) -> hecs::Entity {
        let cell = self.index.cell_key_of(desc.hitbox().center());
        let body = Body::from_desc(desc, self.config.damping_base, cell);
        let entity = self.world.spawn((body,));
        if let Ok(mut body) = self.world.get::<&mut Body>(entity) {
            check_extent(&self.index, self.config.neighborhood_cells, entity, &mut body);
        }
        self.index.insert_at(entity, cell);
        self.order.push(entity);
        debug!(?entity, ?cell, "spawned body");
        entity
    }

    /// Deregister and remove a body, returning it.
    pub fn despawn(&mut self, entity: hecs::Entity) -> Result<Body> {
        let body = self
            .world
            .remove_one::<Body>(entity)
            .map_err(|_| PhysicsError::UnknownBody(entity))?;
        // Drop anything gameplay attached. The entity is live since the
        // `Body` was just removed from it.
        let despawned = self.world.despawn(entity);
        debug_assert!(despawned.is_ok(), "body entity vanished during despawn");
        self.index.remove(entity, body.cell);
        if let Some(slot) = self.order.iter().position(|e| *e == entity) {
            self.order.remove(slot);
        }
        debug!(?entity, cell = ?body.cell, "despawned body");
        Ok(body)
    }

    pub fn body(&self, entity: hecs::Entity) -> Result<hecs::Ref<'_, Body>> {
        self.world
            .get::<&Body>(entity)
            .map_err(|_| PhysicsError::UnknownBody(entity))
    }

    pub fn body_mut(&self, entity: hecs::Entity) -> Result<hecs::RefMut<'_, Body>> {
        self.world
            .get::<&mut Body>(entity)
            .map_err(|_| PhysicsError::UnknownBody(entity))
    }

    /// Attach a gameplay component to a body entity.
    pub fn attach<C: hecs::Component>(&mut self, entity: hecs::Entity, component: C) -> Result<()> {
        if TypeId::of::<C>() == TypeId::of::<Body>() {
            return Err(PhysicsError::BodyComponent(entity));
        }
        if !self.contains(entity) {
            return Err(PhysicsError::UnknownBody(entity));
        }
        self.world
            .insert_one(entity, component)
            .map_err(|_| PhysicsError::UnknownBody(entity))
    }

    /// Remove a gameplay component. `Ok(None)` if the body did not have one.
    pub fn detach<C: hecs::Component>(&mut self, entity: hecs::Entity) -> Result<Option<C>> {
        if TypeId::of::<C>() == TypeId::of::<Body>() {
            return Err(PhysicsError::BodyComponent(entity));
        }
        if !self.contains(entity) {
            return Err(PhysicsError::UnknownBody(entity));
        }
        Ok(self.world.remove_one::<C>(entity).ok())
    }

    /// Move a body and re-register it immediately.
    pub fn teleport(&mut self, entity: hecs::Entity, position: Vec2) -> Result<()> {
        let mut body = self
            .world
            .get::<&mut Body>(entity)
            .map_err(|_| PhysicsError::UnknownBody(entity))?;
        body.position = position;
        body.previous_position = position;
        body.hitbox.set_position(position);
        let cell = self.index.cell_key_of(position);
        if self.index.rehome(entity, body.cell, cell) {
            body.cell = cell;
        }
        Ok(())
    }

    /// Run the per-body update for a single body.
    ///
    /// Returns the contacts found for it. Prefer [`PhysicsWorld::step`] for a
    /// whole frame.
    pub fn update_position(&mut self, entity: hecs::Entity, dt: f32) -> Result<&[Contact]> {
        self.contacts.clear();
        self.update_body(entity, dt)?;
        Ok(self.contacts.as_slice())
    }

    /// Update every body once, in registration order.
    pub fn step(&mut self, dt: f32) -> &[Contact] {
        self.step_with(dt, |_, _| {})
    }

    /// Like [`PhysicsWorld::step`], calling `on_contact` for each contact as
    /// soon as it is found. Structural changes queued on the [`Commands`]
    /// are applied after the pass.
    pub fn step_with<F>(&mut self, dt: f32, mut on_contact: F) -> &[Contact]
    where
        F: FnMut(&Contact, &mut Commands),
    {
        self.contacts.clear();
        for i in 0..self.order.len() {
            let entity = self.order[i];
            let first = self.contacts.len();
            if let Err(err) = self.update_body(entity, dt) {
                warn!(?entity, %err, "skipping body");
                continue;
            }
            for contact in &self.contacts[first..] {
                on_contact(contact, &mut self.commands);
            }
        }
        self.apply_commands();
        self.frame += 1;
        &self.contacts
    }

    /// Advance by `delta_time` seconds in whole fixed timesteps.
    ///
    /// Runs at most `max_substeps` passes and returns how many ran. Contacts
    /// of the last pass are kept.
    pub fn advance(&mut self, delta_time: f64) -> u32 {
        self.accumulator += delta_time;

        let mut substeps = 0u32;
        while self.accumulator >= self.config.fixed_timestep && substeps < self.config.max_substeps
        {
            self.step(self.config.fixed_timestep as f32);
            self.accumulator -= self.config.fixed_timestep;
            substeps += 1;
        }

        // Clamp accumulator to avoid spiral of death
        if self.accumulator > self.config.fixed_timestep * self.config.max_substeps as f64 {
            self.accumulator = 0.0;
        }
        substeps
    }

    /// Bodies registered in the neighborhood of `position`, using the
    /// configured radius. A conservative superset of what can touch there.
    pub fn query_neighborhood(&self, position: Vec2) -> impl Iterator<Item = hecs::Entity> + '_ {
        self.index
            .query_neighborhood(position, self.config.neighborhood_cells)
    }

    /// Bodies registered within the cells covering a circle of `radius`.
    pub fn query_radius(&self, position: Vec2, radius: f32) -> impl Iterator<Item = hecs::Entity> + '_ {
        self.index.query_radius(position, radius)
    }

    /// Bodies whose hitbox exactly overlaps `hitbox` (an aim preview, an
    /// explosion area). Bodies with `no_collision` are still reported.
    pub fn overlapping(&self, hitbox: &Hitbox) -> Vec<hecs::Entity> {
        let reach = self
            .index
            .cells_for(hitbox.bounding_radius())
            .saturating_add(self.config.neighborhood_cells);
        self.index
            .query_neighborhood(hitbox.center(), reach)
            .filter(|entity| {
                self.world
                    .get::<&Body>(*entity)
                    .map_or(false, |body| body.hitbox.is_colliding(hitbox))
            })
            .collect()
    }

    /// Whether two bodies are registered in the same or adjacent cells.
    pub fn is_near(&self, a: hecs::Entity, b: hecs::Entity) -> Result<bool> {
        let (ax, ay) = self.body(a)?.cell;
        let (bx, by) = self.body(b)?.cell;
        Ok((ax - bx).abs() <= 1 && (ay - by).abs() <= 1)
    }

    /// Emit every body's hitbox outline in registration order.
    pub fn draw_debug(&self, target: &mut impl DebugDraw, camera: Vec2) {
        for entity in &self.order {
            if let Ok(body) = self.world.get::<&Body>(*entity) {
                body.hitbox.draw(target, camera);
            }
        }
    }

    fn update_body(&mut self, entity: hecs::Entity, dt: f32) -> Result<()> {
        let push_force = self.config.push_force;
        let neighborhood = self.config.neighborhood_cells;

        // 1-3. Contacts and repulsion, read-only.
        let mut force = Vec2::ZERO;
        {
            let body = self
                .world
                .get::<&Body>(entity)
                .map_err(|_| PhysicsError::UnknownBody(entity))?;
            if !body.filter.no_collision {
                for other in self.index.query_neighborhood(body.position, neighborhood) {
                    if other == entity {
                        continue;
                    }
                    let Ok(other_body) = self.world.get::<&Body>(other) else {
                        warn!(?other, "stale handle in spatial index");
                        continue;
                    };
                    if !body.filter.admits(other, other_body.kind) {
                        continue;
                    }
                    if !body.hitbox.is_colliding(&other_body.hitbox) {
                        continue;
                    }
                    let normal = contact_normal(body.position, other_body.position, entity, other);
                    force += contact_force(normal, &body.response, &other_body.response, push_force);
                    self.contacts.push(Contact {
                        body: entity,
                        kind: body.kind,
                        other,
                        other_kind: other_body.kind,
                        normal,
                    });
                }
            }
        }

        let mut body = self
            .world
            .get::<&mut Body>(entity)
            .map_err(|_| PhysicsError::UnknownBody(entity))?;
        body.apply_force(force);

        // 4. Integrate velocity
        integrator::integrate_velocity(&mut body, dt);

        // 5. Integrate position and sync hitbox
        integrator::integrate_position(&mut body, dt);
        integrator::sync_hitbox(&mut body);

        // 6. Re-register
        let cell = self.index.cell_key_of(body.position);
        if self.index.rehome(entity, body.cell, cell) {
            body.cell = cell;
        }
        check_extent(&self.index, neighborhood, entity, &mut body);

        // 7. Clear forces
        integrator::clear_forces(&mut body);
        Ok(())
    }

    fn apply_commands(&mut self) {
        self.last_spawned.clear();
        if self.commands.is_empty() {
            return;
        }

        let despawns = std::mem::take(&mut self.commands.despawns);
        for entity in despawns {
            if self.despawn(entity).is_err() {
                trace!(?entity, "deferred despawn of missing body ignored");
            }
        }

        let spawns = std::mem::take(&mut self.commands.spawns);
        for desc in spawns {
            let entity = self.spawn(desc);
            self.last_spawned.push(entity);
        }
        debug!(spawned = self.last_spawned.len(), "applied deferred commands");
    }
}

/// Warn once per body whose hitbox is too large for the neighborhood query
/// to be complete.
fn check_extent(index: &SpatialIndex, neighborhood: i32, entity: hecs::Entity, body: &mut Body) {
    if body.oversize_warned {
        return;
    }
    let limit = index.max_complete_radius(neighborhood);
    let radius = body.hitbox.bounding_radius();
    if radius > limit {
        warn!(?entity, radius, limit, "hitbox exceeds neighborhood bound, contacts may be missed");
        body.oversize_warned = true;
    }
}
