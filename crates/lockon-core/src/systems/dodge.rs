//! Dodge system - launch velocity with side-step correction while locked

use hecs::{Entity, World};
use lockon_logic::dodge::dodge_velocity;
use lockon_logic::math::Vec3;

use crate::components::{Dodge, Transform};

/// Launch velocity for `entity` dodging along `direction`.
///
/// A despawned lock target is ignored, giving a plain dodge.
pub fn dodge(world: &World, entity: Entity, direction: Vec3) -> Option<Vec3> {
    let dodge = *world.get::<&Dodge>(entity).ok()?;
    let transform = *world.get::<&Transform>(entity).ok()?;
    let target = dodge
        .target
        .and_then(|t| world.get::<&Transform>(t).ok().map(|tf| tf.position));

    Some(dodge_velocity(
        transform.position,
        transform.forward,
        direction,
        target,
        dodge.config.strength,
    ))
}
