//! Target trace pipeline: sweep, keep lockable actors, rank by distance.

use hecs::{Entity, World};
use lockon_logic::math::Vec3;
use lockon_logic::ranking::rank_by_distance;
use lockon_logic::sweep::{sweep_segment, SweepShape};

use crate::capability::filter_lockable;
use crate::components::{Camera, LockOn, Transform, ViewController};
use crate::query::{QueryFilter, SpatialQuery, SweepRequest};

/// Where a trace starts and which way it points.
///
/// Entities with a `Camera` trace from the camera (positioned by its offset,
/// aimed by the control rotation when there is a `ViewController`), others
/// from their own transform.
pub fn trace_origin(world: &World, owner: Entity) -> Option<(Vec3, Vec3)> {
    let transform = *world.get::<&Transform>(owner).ok()?;
    match world.get::<&Camera>(owner) {
        Ok(camera) => {
            let forward = world
                .get::<&ViewController>(owner)
                .map(|vc| vc.control_rotation.forward())
                .unwrap_or(transform.forward);
            Some((transform.position + camera.offset, forward))
        }
        Err(_) => Some((transform.position, transform.forward)),
    }
}

/// Build the sweep for `owner` from its lock config.
pub fn sweep_request(world: &World, owner: Entity) -> Option<SweepRequest> {
    let config = *world.get::<&LockOn>(owner).ok()?.config();
    let (origin, forward) = trace_origin(world, owner)?;
    let (from, to) = sweep_segment(origin, forward, config.near_distance(), config.far_distance())?;
    Some(SweepRequest {
        shape: SweepShape::sphere(config.radius()),
        from,
        to,
        filter: QueryFilter::new().ignore_actor(owner),
    })
}

/// Lockable targets in front of `owner`, closest to the owner first.
///
/// Ranking is by distance from the owner's own position even when the sweep
/// runs from its camera.
pub fn trace_lockable(world: &World, query: &dyn SpatialQuery, owner: Entity) -> Vec<Entity> {
    let Some(request) = sweep_request(world, owner) else {
        return Vec::new();
    };
    let Ok(position) = world.get::<&Transform>(owner).map(|t| t.position) else {
        return Vec::new();
    };

    let hits = query.sweep(world, &request);
    let candidates = filter_lockable(world, &hits);
    let ranked = rank_by_distance(position, &candidates);
    log::trace!(
        "Trace for {:?}: {} hits, {} lockable",
        owner,
        hits.len(),
        ranked.len()
    );
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Collider;
    use crate::query::WorldSweep;
    use lockon_logic::config::LockConfig;
    use lockon_logic::math::Rotator;

    fn spawn_target(world: &mut World, position: Vec3) -> Entity {
        world.spawn((Transform::at(position), Collider::sphere(1.0), LockOn::target()))
    }

    fn spawn_owner(world: &mut World) -> Entity {
        let config = LockConfig::new(5.0, 100.0, 3.0, false).unwrap();
        world.spawn((Transform::at(Vec3::ZERO), Collider::sphere(1.0), LockOn::new(config)))
    }

    #[test]
    fn test_trace_ranks_by_owner_distance() {
        let mut world = World::new();
        let owner = spawn_owner(&mut world);
        let far = spawn_target(&mut world, Vec3::new(60.0, 0.0, 0.0));
        let near = spawn_target(&mut world, Vec3::new(20.0, 2.0, 0.0));
        spawn_target(&mut world, Vec3::new(-30.0, 0.0, 0.0)); // behind
        spawn_target(&mut world, Vec3::new(40.0, 10.0, 0.0)); // off to the side

        let ranked = trace_lockable(&world, &WorldSweep, owner);
        assert_eq!(ranked, vec![near, far]);
    }

    #[test]
    fn test_camera_mode_traces_along_control_rotation() {
        let mut world = World::new();
        let owner = spawn_owner(&mut world);
        world
            .insert(
                owner,
                (
                    Camera { offset: Vec3::new(0.0, 0.0, 2.0) },
                    ViewController::new(Rotator::new(0.0, 90.0, 0.0)),
                ),
            )
            .unwrap();
        spawn_target(&mut world, Vec3::new(50.0, 0.0, 0.0));
        let left = spawn_target(&mut world, Vec3::new(0.0, 50.0, 1.0));

        assert_eq!(trace_origin(&world, owner).unwrap().0, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(trace_lockable(&world, &WorldSweep, owner), vec![left]);
    }

    #[test]
    fn test_no_transform_traces_nothing() {
        let mut world = World::new();
        let owner = world.spawn((LockOn::default(),));
        spawn_target(&mut world, Vec3::new(500.0, 0.0, 0.0));
        assert!(trace_lockable(&world, &WorldSweep, owner).is_empty());
    }
}
