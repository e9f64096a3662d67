//! Lockable capability lookup and hit filtering.

use hecs::{Entity, World};
use lockon_logic::math::Vec3;
use lockon_logic::ranking::Candidate;
use lockon_logic::TargetStatus;

use crate::components::{LockOn, Transform};
use crate::query::Hit;

/// What the lock system can see of a potential target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockableHandle {
    pub entity: Entity,
    pub lockable: bool,
    pub position: Vec3,
}

/// Lock capability of `entity`: `None` unless it is alive, carries a
/// `LockOn` and has a `Transform`.
pub fn lockable_handle(world: &World, entity: Entity) -> Option<LockableHandle> {
    let lock = world.get::<&LockOn>(entity).ok()?;
    let transform = world.get::<&Transform>(entity).ok()?;
    Some(LockableHandle {
        entity,
        lockable: lock.lockable,
        position: transform.position,
    })
}

/// Tick-time status of a locked target.
pub fn target_status(world: &World, target: Option<Entity>) -> TargetStatus {
    match target.and_then(|t| lockable_handle(world, t)) {
        Some(handle) if handle.lockable => TargetStatus::Lockable,
        Some(_) => TargetStatus::Unlockable,
        None => TargetStatus::Missing,
    }
}

/// Keep hits whose actor is currently lockable, first hit per actor, in hit
/// order. Actors without the capability are dropped silently.
pub fn filter_lockable(world: &World, hits: &[Hit]) -> Vec<Candidate<Entity>> {
    let mut candidates: Vec<Candidate<Entity>> = Vec::with_capacity(hits.len());
    for hit in hits {
        if candidates.iter().any(|c| c.target == hit.actor) {
            continue;
        }
        match lockable_handle(world, hit.actor) {
            Some(handle) if handle.lockable => {
                candidates.push(Candidate::new(handle.entity, handle.position));
            }
            _ => {}
        }
    }
    candidates
}
