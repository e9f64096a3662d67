//! Turning input while locked: stick flicks cycle the lock instead of
//! rotating the view.
//!
//! A flick past the dead zone cycles once and disarms the gate. The gate
//! re-arms only after both turn axes have come back inside the dead zone, so
//! holding the stick over does not spin through every target.

use crate::config::CycleInputConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAxis {
    Up,
    Right,
}

/// What a turn input should do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnAction {
    /// Not locked: rotate the view by this amount on the axis.
    Rotate(TurnAxis, f32),
    /// Locked: cycle the lock by this offset.
    Cycle(i64),
    /// Locked, but the input is inside the dead zone or the gate is disarmed.
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleGate {
    sensitivity: f32,
    armed: bool,
    last_up: f32,
    last_right: f32,
}

impl Default for CycleGate {
    fn default() -> Self {
        Self::new(&CycleInputConfig::default())
    }
}

impl CycleGate {
    pub fn new(config: &CycleInputConfig) -> Self {
        Self {
            sensitivity: config.sensitivity.abs(),
            armed: true,
            last_up: 0.0,
            last_right: 0.0,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    fn in_dead_zone(&self, value: f32) -> bool {
        (-self.sensitivity..=self.sensitivity).contains(&value)
    }

    /// Feed one axis sample and decide what it does.
    pub fn turn(&mut self, axis: TurnAxis, value: f32, locked: bool) -> TurnAction {
        match axis {
            TurnAxis::Up => self.last_up = value,
            TurnAxis::Right => self.last_right = value,
        }
        if self.in_dead_zone(self.last_up) && self.in_dead_zone(self.last_right) {
            self.armed = true;
        }

        if !locked {
            return TurnAction::Rotate(axis, value);
        }
        if !self.armed || self.in_dead_zone(value) {
            return TurnAction::Hold;
        }

        self.armed = false;
        if value > 0.0 {
            TurnAction::Cycle(1)
        } else {
            TurnAction::Cycle(-1)
        }
    }
}
