//! Lock system - begin/end/cycle operations and the per-tick self-check.
//!
//! Each operation reads the world first (trace), then mutates the owner's
//! `LockOn`. When the machine emits a change, the owner's follower
//! components (camera tracker, driver, dodge) are updated in the same call.

use hecs::{Entity, World};
use lockon_logic::machine::{LockMachine, LockState, TargetStatus, TickOutcome};
use lockon_logic::LockError;

use crate::capability::target_status;
use crate::components::{CameraTracker, Dodge, LockDriver, LockOn, ViewController};
use crate::query::SpatialQuery;
use crate::trace::trace_lockable;

/// Lock `owner` onto the closest lockable target in front of it.
pub fn begin_lock_on(
    world: &mut World,
    query: &dyn SpatialQuery,
    owner: Entity,
) -> Result<Entity, LockError> {
    let state = machine_state(world, owner)?;
    let candidates = match state {
        LockState::Unlocked => trace_lockable(world, query, owner),
        LockState::Locked { .. } => Vec::new(),
    };
    with_machine(world, owner, |m| m.try_begin_lock_on(move || candidates))?
}

/// End `owner`'s lock, if it has one.
pub fn end_lock_on(world: &mut World, owner: Entity) -> Result<(), LockError> {
    machine_state(world, owner)?;
    with_machine(world, owner, |m| m.end_lock_on())
}

/// Move `owner`'s lock `offset` places through a fresh trace.
pub fn cycle_lock(
    world: &mut World,
    query: &dyn SpatialQuery,
    owner: Entity,
    offset: i64,
) -> Result<Entity, LockError> {
    let state = machine_state(world, owner)?;
    let candidates = match state {
        LockState::Locked { target: Some(_) } => trace_lockable(world, query, owner),
        _ => Vec::new(),
    };
    with_machine(world, owner, |m| m.try_cycle_lock(offset, move || candidates))?
}

/// Re-check every active lock.
///
/// Receive-only machines skip the self-check: an unlockable target is kept.
/// A lost target still releases their lock.
///
/// Returns the owners whose lock changed and what happened to it.
pub fn lock_tick_system(
    world: &mut World,
    query: &dyn SpatialQuery,
) -> Vec<(Entity, TickOutcome<Entity>)> {
    let active: Vec<(Entity, Option<Entity>, bool)> = world
        .query::<&LockOn>()
        .iter()
        .filter(|(_, lock)| lock.machine.is_locked())
        .map(|(owner, lock)| (owner, lock.machine.target(), lock.config().is_receive_only()))
        .collect();

    let mut changed = Vec::new();
    for (owner, target, receive_only) in active {
        let status = target_status(world, target);
        if receive_only && status != TargetStatus::Missing {
            continue;
        }
        let candidates = match (target, status) {
            (Some(_), TargetStatus::Unlockable) => trace_lockable(world, query, owner),
            _ => Vec::new(),
        };

        let outcome = with_machine(world, owner, |m| m.reconcile(status, move || candidates));
        match outcome {
            Ok(TickOutcome::Kept) | Ok(TickOutcome::Idle) | Err(_) => {}
            Ok(outcome) => {
                log::debug!("Tick reconciled lock of {:?}: {:?}", owner, outcome);
                changed.push((owner, outcome));
            }
        }
    }
    changed
}

/// Mark every lock on `target` as lost. The owners end their locks on their
/// next tick. Call before despawning a lockable entity.
pub fn forget_target(world: &mut World, target: Entity) -> usize {
    let mut forgotten = 0;
    for (_, lock) in world.query_mut::<&mut LockOn>() {
        if lock.machine.forget_target(target) {
            forgotten += 1;
        }
    }
    forgotten
}

fn machine_state(world: &World, owner: Entity) -> Result<LockState<Entity>, LockError> {
    match world.get::<&LockOn>(owner) {
        Ok(lock) => Ok(lock.machine.state()),
        Err(e) => {
            log::warn!("Lock operation on {:?} without a lock machine: {}", owner, e);
            Err(LockError::InvalidTransition)
        }
    }
}

/// Run `op` on `owner`'s machine, then push any emitted change to followers.
fn with_machine<R>(
    world: &mut World,
    owner: Entity,
    op: impl FnOnce(&mut LockMachine<Entity>) -> R,
) -> Result<R, LockError> {
    let (result, change) = {
        let mut lock = world
            .get::<&mut LockOn>(owner)
            .map_err(|_| LockError::InvalidTransition)?;
        let before = lock.machine.revision();
        let result = op(&mut lock.machine);
        let change = (lock.machine.revision() != before).then(|| lock.machine.target());
        (result, change)
    };

    if let Some(target) = change {
        notify_followers(world, owner, target);
    }
    Ok(result)
}

/// Mirror a lock change into the owner's follower components.
fn notify_followers(world: &mut World, owner: Entity, target: Option<Entity>) {
    if let Ok(mut tracker) = world.get::<&mut CameraTracker>(owner) {
        tracker.target = target;
        if let Ok(mut controller) = world.get::<&mut ViewController>(owner) {
            controller.use_control_rotation = match target {
                Some(_) => true,
                None => tracker.default_use_control_rotation,
            };
        }
    }
    if let Ok(mut driver) = world.get::<&mut LockDriver>(owner) {
        driver.locked_on = target.is_some();
    }
    if let Ok(mut dodge) = world.get::<&mut Dodge>(owner) {
        dodge.target = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Collider, Transform};
    use crate::query::WorldSweep;
    use lockon_logic::config::LockConfig;
    use lockon_logic::math::Vec3;

    fn scene() -> (World, Entity, Vec<Entity>) {
        let mut world = World::new();
        let config = LockConfig::new(0.0, 100.0, 2.0, false).unwrap();
        let owner = world.spawn((
            Transform::at(Vec3::ZERO),
            Collider::sphere(1.0),
            LockOn::new(config),
            LockDriver::default(),
            Dodge::default(),
        ));
        let targets = [10.0, 30.0, 50.0]
            .iter()
            .map(|x| {
                world.spawn((
                    Transform::at(Vec3::new(*x, 0.0, 0.0)),
                    Collider::sphere(1.0),
                    LockOn::target(),
                ))
            })
            .collect();
        (world, owner, targets)
    }

    #[test]
    fn test_begin_updates_followers() {
        let (mut world, owner, targets) = scene();
        assert_eq!(begin_lock_on(&mut world, &WorldSweep, owner), Ok(targets[0]));
        assert!(world.get::<&LockDriver>(owner).unwrap().locked_on);
        assert_eq!(world.get::<&Dodge>(owner).unwrap().target, Some(targets[0]));

        assert_eq!(end_lock_on(&mut world, owner), Ok(()));
        assert!(!world.get::<&LockDriver>(owner).unwrap().locked_on);
        assert_eq!(world.get::<&Dodge>(owner).unwrap().target, None);
    }

    #[test]
    fn test_operations_without_machine_fail() {
        let mut world = World::new();
        let bare = world.spawn((Transform::default(),));
        assert_eq!(
            begin_lock_on(&mut world, &WorldSweep, bare),
            Err(LockError::InvalidTransition)
        );
        assert_eq!(
            cycle_lock(&mut world, &WorldSweep, bare, 1),
            Err(LockError::InvalidTransition)
        );
        assert_eq!(end_lock_on(&mut world, bare), Err(LockError::InvalidTransition));
    }

    #[test]
    fn test_cycle_through_world() {
        let (mut world, owner, targets) = scene();
        begin_lock_on(&mut world, &WorldSweep, owner).unwrap();
        assert_eq!(cycle_lock(&mut world, &WorldSweep, owner, 1), Ok(targets[1]));
        assert_eq!(cycle_lock(&mut world, &WorldSweep, owner, -2), Ok(targets[2]));
        assert_eq!(world.get::<&Dodge>(owner).unwrap().target, Some(targets[2]));
    }

    #[test]
    fn test_tick_heals_and_skips_receive_only() {
        let (mut world, owner, targets) = scene();
        begin_lock_on(&mut world, &WorldSweep, owner).unwrap();
        world.get::<&mut LockOn>(targets[0]).unwrap().lockable = false;

        let changed = lock_tick_system(&mut world, &WorldSweep);
        assert_eq!(changed, vec![(owner, TickOutcome::Cycled(targets[1]))]);
        assert_eq!(world.get::<&Dodge>(owner).unwrap().target, Some(targets[1]));

        // Healthy lock on the new target, nothing to report
        assert!(lock_tick_system(&mut world, &WorldSweep).is_empty());
    }

    #[test]
    fn test_forgotten_target_ends_lock_on_tick() {
        let (mut world, owner, targets) = scene();
        begin_lock_on(&mut world, &WorldSweep, owner).unwrap();
        assert_eq!(forget_target(&mut world, targets[0]), 1);
        world.despawn(targets[0]).unwrap();

        let changed = lock_tick_system(&mut world, &WorldSweep);
        assert_eq!(changed, vec![(owner, TickOutcome::Ended)]);
        assert!(!world.get::<&LockOn>(owner).unwrap().machine.is_locked());
        assert!(!world.get::<&LockDriver>(owner).unwrap().locked_on);
    }

    #[test]
    fn test_despawned_target_without_forget_ends_lock() {
        let (mut world, owner, targets) = scene();
        begin_lock_on(&mut world, &WorldSweep, owner).unwrap();
        world.despawn(targets[0]).unwrap();

        let changed = lock_tick_system(&mut world, &WorldSweep);
        assert_eq!(changed, vec![(owner, TickOutcome::Ended)]);
    }

    #[test]
    fn test_receive_only_releases_lost_target() {
        let (mut world, owner, targets) = scene();
        world.despawn(owner).unwrap();
        let turret = world.spawn((
            Transform::at(Vec3::ZERO),
            LockOn::new(LockConfig::new(0.0, 100.0, 2.0, true).unwrap()),
            Dodge::default(),
        ));
        assert_eq!(begin_lock_on(&mut world, &WorldSweep, turret), Ok(targets[0]));

        // Unlockable target: no self-check for receive-only machines
        world.get::<&mut LockOn>(targets[0]).unwrap().lockable = false;
        assert!(lock_tick_system(&mut world, &WorldSweep).is_empty());

        forget_target(&mut world, targets[0]);
        world.despawn(targets[0]).unwrap();
        let changed = lock_tick_system(&mut world, &WorldSweep);
        assert_eq!(changed, vec![(turret, TickOutcome::Ended)]);
        assert_eq!(world.get::<&Dodge>(turret).unwrap().target, None);

        assert_eq!(begin_lock_on(&mut world, &WorldSweep, turret), Ok(targets[1]));
    }
}
