//! Camera tracking system - turns locked-on views toward their target

use hecs::{Entity, World};
use lockon_logic::camera::track_step;
use lockon_logic::math::{Rotator, Vec3};

use crate::components::{Camera, CameraTracker, LockOn, Transform, ViewController};

/// Step every tracking camera toward its locked target.
///
/// Trackers whose target has despawned are left alone; the lock system ends
/// the lock on its next tick and the tracker is cleared then.
pub fn camera_tracking_system(world: &mut World, delta_seconds: f32) {
    let mut updates: Vec<(Entity, Rotator)> = Vec::new();

    for (entity, (tracker, controller, transform, camera)) in world
        .query::<(&CameraTracker, &ViewController, &Transform, Option<&Camera>)>()
        .iter()
    {
        let Some(target) = tracker.target else {
            continue;
        };
        let Ok(target_pos) = world.get::<&Transform>(target).map(|t| t.position) else {
            continue;
        };

        let camera_pos = transform.position + camera.map(|c| c.offset).unwrap_or(Vec3::ZERO);
        let rotation = track_step(
            controller.control_rotation,
            camera_pos,
            target_pos,
            delta_seconds,
            &tracker.config,
        );
        updates.push((entity, rotation));
    }

    for (entity, rotation) in updates {
        if let Ok(mut controller) = world.get::<&mut ViewController>(entity) {
            controller.control_rotation = rotation;
        }
    }
}

/// Attach a tracker to `entity`, remembering its current control setting.
pub fn attach_camera_tracker(
    world: &mut World,
    entity: Entity,
    mut tracker: CameraTracker,
) -> bool {
    let default_use = match world.get::<&ViewController>(entity) {
        Ok(controller) => controller.use_control_rotation,
        Err(_) => return false,
    };
    tracker.default_use_control_rotation = default_use;
    tracker.target = world
        .get::<&LockOn>(entity)
        .ok()
        .and_then(|lock| lock.machine.target());
    world.insert_one(entity, tracker).is_ok()
}
