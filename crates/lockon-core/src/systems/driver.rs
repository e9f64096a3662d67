//! Turn driver system - turn input rotates the view or cycles the lock

use hecs::{Entity, World};
use lockon_logic::input::{TurnAction, TurnAxis};

use crate::components::{LockDriver, ViewController};
use crate::query::SpatialQuery;
use super::lock::cycle_lock;

/// Feed one turn-axis sample for `entity`.
///
/// Returns `None` when the entity has no `LockDriver`.
pub fn turn(
    world: &mut World,
    query: &dyn SpatialQuery,
    entity: Entity,
    axis: TurnAxis,
    value: f32,
) -> Option<TurnAction> {
    let action = {
        let mut driver = world.get::<&mut LockDriver>(entity).ok()?;
        let locked = driver.locked_on;
        driver.gate.turn(axis, value, locked)
    };

    match action {
        TurnAction::Rotate(axis, value) => {
            if let Ok(mut controller) = world.get::<&mut ViewController>(entity) {
                match axis {
                    TurnAxis::Right => controller.add_yaw_input(value),
                    TurnAxis::Up => controller.add_pitch_input(value),
                }
            }
        }
        TurnAction::Cycle(offset) => {
            if let Err(e) = cycle_lock(world, query, entity, offset) {
                log::debug!("Turn cycle for {:?} failed: {}", entity, e);
            }
        }
        TurnAction::Hold => {}
    }
    Some(action)
}
