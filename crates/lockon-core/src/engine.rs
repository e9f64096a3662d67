//! Lock-on engine - main entry point for hosts

use hecs::{Entity, World};
use lockon_logic::config::LockOnSettings;
use lockon_logic::input::{TurnAction, TurnAxis};
use lockon_logic::machine::{ListenerId, TickOutcome};
use lockon_logic::math::{Rotator, Vec3};
use lockon_logic::LockError;

use crate::components::*;
use crate::query::{SpatialQuery, WorldSweep};
use crate::systems::*;
use crate::trace::trace_lockable;

/// Collision radius given to spawned characters
pub const CHARACTER_RADIUS: f32 = 42.0;

/// Owns the world and the spatial query, and drives the per-frame update
pub struct LockOnEngine {
    /// ECS world containing all entities
    pub world: World,
    query: Box<dyn SpatialQuery>,
    frame: u64,
    /// Elapsed time in seconds
    time: f64,
}

impl LockOnEngine {
    /// Engine answering sweeps from the world's own colliders
    pub fn new() -> Self {
        Self::with_query(WorldSweep)
    }

    /// Engine answering sweeps through a host-provided query
    pub fn with_query(query: impl SpatialQuery + 'static) -> Self {
        Self {
            world: World::new(),
            query: Box::new(query),
            frame: 0,
            time: 0.0,
        }
    }

    /// Advance one frame: re-check locks, then turn tracking cameras.
    ///
    /// Returns the locks the self-check changed.
    pub fn update(&mut self, delta_seconds: f32) -> Vec<(Entity, TickOutcome<Entity>)> {
        self.frame += 1;
        self.time += delta_seconds as f64;

        let changed = lock_tick_system(&mut self.world, self.query.as_ref());
        camera_tracking_system(&mut self.world, delta_seconds);
        changed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    // ── Spawning ────────────────────────────────────────────────────────

    /// An AI-style character: traces from its own transform.
    pub fn spawn_character(
        &mut self,
        position: Vec3,
        forward: Vec3,
        settings: &LockOnSettings,
    ) -> Entity {
        self.world.spawn((
            Transform::at(position).facing(forward),
            Collider::sphere(CHARACTER_RADIUS),
            LockOn::new(settings.lock),
            LockDriver::new(&settings.input),
            Dodge::new(settings.dodge),
        ))
    }

    /// A player character: traces from its camera and tracks its lock.
    pub fn spawn_player(
        &mut self,
        position: Vec3,
        camera_offset: Vec3,
        view: Rotator,
        settings: &LockOnSettings,
    ) -> Entity {
        let entity = self.spawn_character(position, view.forward(), settings);
        let view_parts = (Camera { offset: camera_offset }, ViewController::new(view));
        if let Err(e) = self.world.insert(entity, view_parts) {
            log::warn!("Player {:?} spawned without a camera: {}", entity, e);
            return entity;
        }
        if !attach_camera_tracker(&mut self.world, entity, CameraTracker::new(settings.camera)) {
            log::warn!("Player {:?} spawned without a camera tracker", entity);
        }
        entity
    }

    /// Something that can only be locked onto.
    pub fn spawn_target(&mut self, position: Vec3, radius: f32) -> Entity {
        self.world.spawn((
            Transform::at(position),
            Collider::sphere(radius),
            LockOn::target(),
        ))
    }

    /// Add a collision primitive to `actor`, `offset` from its position.
    pub fn attach_collider(
        &mut self,
        actor: Entity,
        offset: Vec3,
        collider: Collider,
    ) -> Option<Entity> {
        let position = self.world.get::<&Transform>(actor).ok()?.position;
        Some(self.world.spawn((Transform::at(position + offset), collider, AttachedTo(actor))))
    }

    /// Despawn `entity` and its attached primitives. Locks on it end at the
    /// next update.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.world.contains(entity) {
            return false;
        }
        forget_target(&mut self.world, entity);

        let attached: Vec<Entity> = self
            .world
            .query::<&AttachedTo>()
            .iter()
            .filter(|(_, a)| a.0 == entity)
            .map(|(e, _)| e)
            .collect();
        for part in attached {
            let _ = self.world.despawn(part);
        }
        self.world.despawn(entity).is_ok()
    }

    /// Move `entity` and its attached primitives.
    pub fn move_to(&mut self, entity: Entity, position: Vec3) -> bool {
        let delta = match self.world.get::<&mut Transform>(entity) {
            Ok(mut transform) => {
                let delta = position - transform.position;
                transform.position = position;
                delta
            }
            Err(_) => return false,
        };
        for (_, (transform, attached)) in self.world.query_mut::<(&mut Transform, &AttachedTo)>() {
            if attached.0 == entity {
                transform.position = transform.position + delta;
            }
        }
        true
    }

    pub fn face(&mut self, entity: Entity, forward: Vec3) -> bool {
        match self.world.get::<&mut Transform>(entity) {
            Ok(mut transform) => {
                transform.forward = forward;
                true
            }
            Err(_) => false,
        }
    }

    // ── Lock operations ─────────────────────────────────────────────────

    pub fn try_begin_lock_on(&mut self, entity: Entity) -> Result<Entity, LockError> {
        begin_lock_on(&mut self.world, self.query.as_ref(), entity)
    }

    /// Returns whether a lock was formed.
    pub fn begin_lock_on(&mut self, entity: Entity) -> bool {
        self.try_begin_lock_on(entity).is_ok()
    }

    /// Entities without a lock machine are logged and ignored.
    pub fn end_lock_on(&mut self, entity: Entity) {
        end_lock_on(&mut self.world, entity).ok();
    }

    pub fn try_cycle_lock(&mut self, entity: Entity, offset: i64) -> Result<Entity, LockError> {
        cycle_lock(&mut self.world, self.query.as_ref(), entity, offset)
    }

    /// Positive offsets move to further targets, negative to closer ones.
    pub fn cycle_lock(&mut self, entity: Entity, offset: i64) -> bool {
        self.try_cycle_lock(entity, offset).is_ok()
    }

    /// Register a closure called synchronously on every lock change of
    /// `entity`, after earlier registrations.
    pub fn on_lock_changed<F>(&mut self, entity: Entity, listener: F) -> Option<ListenerId>
    where
        F: FnMut(Option<Entity>) + Send + Sync + 'static,
    {
        let mut lock = self.world.get::<&mut LockOn>(entity).ok()?;
        Some(lock.machine.on_lock_changed(listener))
    }

    pub fn remove_lock_listener(&mut self, entity: Entity, id: ListenerId) -> bool {
        match self.world.get::<&mut LockOn>(entity) {
            Ok(mut lock) => lock.machine.remove_listener(id),
            Err(_) => false,
        }
    }

    /// Allow or forbid other entities locking onto `entity`.
    pub fn set_lockable(&mut self, entity: Entity, lockable: bool) -> bool {
        match self.world.get::<&mut LockOn>(entity) {
            Ok(mut lock) => {
                lock.lockable = lockable;
                true
            }
            Err(_) => false,
        }
    }

    pub fn locked_target(&self, entity: Entity) -> Option<Entity> {
        self.world
            .get::<&LockOn>(entity)
            .ok()
            .and_then(|lock| lock.machine.target())
    }

    pub fn is_locked(&self, entity: Entity) -> bool {
        self.world
            .get::<&LockOn>(entity)
            .map(|lock| lock.machine.is_locked())
            .unwrap_or(false)
    }

    /// Lockable targets `entity` would see right now, closest first.
    pub fn candidates(&self, entity: Entity) -> Vec<Entity> {
        trace_lockable(&self.world, self.query.as_ref(), entity)
    }

    // ── Followers ───────────────────────────────────────────────────────

    /// Feed turn input; while locked, flicks cycle the lock.
    pub fn turn(&mut self, entity: Entity, axis: TurnAxis, value: f32) -> Option<TurnAction> {
        turn(&mut self.world, self.query.as_ref(), entity, axis, value)
    }

    /// Launch velocity for a dodge, bent around the locked target.
    pub fn dodge(&self, entity: Entity, direction: Vec3) -> Option<Vec3> {
        dodge(&self.world, entity, direction)
    }

    pub fn control_rotation(&self, entity: Entity) -> Option<Rotator> {
        self.world
            .get::<&ViewController>(entity)
            .ok()
            .map(|vc| vc.control_rotation)
    }

    /// Count entities carrying a lock machine
    pub fn lock_count(&self) -> usize {
        self.world.query::<&LockOn>().iter().count()
    }
}

impl Default for LockOnEngine {
    fn default() -> Self {
        Self::new()
    }
}
