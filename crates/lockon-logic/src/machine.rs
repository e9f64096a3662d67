//! Lock state machine.
//!
//! A [`LockMachine`] is either `Unlocked` or `Locked` onto a target handle.
//! It never looks targets up itself: every operation that needs candidates is
//! handed a trace closure returning them ranked closest first, and the
//! per-tick check is handed the current target's [`TargetStatus`]. That keeps
//! the machine independent of how targets are stored.
//!
//! Lock changes are reported synchronously to registered listeners, in
//! registration order, with the new target or `None` when the lock ends.

use std::fmt;

use crate::error::LockError;
use crate::selector::cycle_index;

/// Lock state. `Unlocked` never carries a target; `Locked` may briefly hold
/// `None` after its target disappeared, until the next tick ends the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState<T> {
    Unlocked,
    Locked { target: Option<T> },
}

/// What the owner knows about the current target at tick time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    /// Alive and still lockable.
    Lockable,
    /// Alive but its lockable flag is off.
    Unlockable,
    /// Despawned, or no longer carries a lock capability.
    Missing,
}

/// What a tick did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome<T> {
    /// Not locked; nothing to check.
    Idle,
    /// Target still valid.
    Kept,
    /// Target became unlockable and the lock moved to another one.
    Cycled(T),
    /// Lock ended.
    Ended,
}

/// Handle returned by [`LockMachine::on_lock_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Box<dyn FnMut(Option<T>) + Send + Sync>;

pub struct LockMachine<T> {
    state: LockState<T>,
    listeners: Vec<(ListenerId, Listener<T>)>,
    next_listener: u64,
    /// Bumped on every emitted change.
    revision: u64,
}

impl<T> Default for LockMachine<T> {
    fn default() -> Self {
        Self {
            state: LockState::Unlocked,
            listeners: Vec::new(),
            next_listener: 0,
            revision: 0,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LockMachine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockMachine")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl<T: Copy + PartialEq + fmt::Debug> LockMachine<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LockState<T> {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, LockState::Locked { .. })
    }

    pub fn target(&self) -> Option<T> {
        match self.state {
            LockState::Locked { target } => target,
            LockState::Unlocked => None,
        }
    }

    /// Number of lock changes emitted so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a closure called with every lock change.
    pub fn on_lock_changed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(Option<T>) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Lock onto the closest traced candidate. Only valid while unlocked.
    pub fn try_begin_lock_on<F>(&mut self, trace: F) -> Result<T, LockError>
    where
        F: FnOnce() -> Vec<T>,
    {
        if self.is_locked() {
            return Err(LockError::InvalidTransition);
        }

        let candidates = trace();
        let closest = *candidates.first().ok_or(LockError::QueryEmpty)?;
        self.state = LockState::Locked {
            target: Some(closest),
        };
        log::debug!("Lock acquired on {:?} ({} candidates)", closest, candidates.len());
        self.emit(Some(closest));
        Ok(closest)
    }

    pub fn begin_lock_on<F>(&mut self, trace: F) -> bool
    where
        F: FnOnce() -> Vec<T>,
    {
        self.try_begin_lock_on(trace).is_ok()
    }

    /// Drop the lock. Does nothing, and emits nothing, when already unlocked.
    pub fn end_lock_on(&mut self) {
        if !self.is_locked() {
            return;
        }
        self.state = LockState::Unlocked;
        log::debug!("Lock ended");
        self.emit(None);
    }

    /// Move the lock `offset` places through a fresh trace.
    ///
    /// An empty trace ends the lock. A target missing from the trace (moved
    /// out of range, destroyed or unlockable) is replaced by the closest
    /// candidate.
    pub fn try_cycle_lock<F>(&mut self, offset: i64, trace: F) -> Result<T, LockError>
    where
        F: FnOnce() -> Vec<T>,
    {
        let current = match self.state {
            LockState::Unlocked => return Err(LockError::InvalidTransition),
            LockState::Locked { target: None } => return Err(LockError::TargetInvalidated),
            LockState::Locked { target: Some(t) } => t,
        };

        let candidates = trace();
        if candidates.is_empty() {
            self.end_lock_on();
            return Err(LockError::QueryEmpty);
        }

        let next = match candidates.iter().position(|c| *c == current) {
            Some(index) => cycle_index(index, offset, candidates.len())
                .map(|i| candidates[i])
                .unwrap_or(candidates[0]),
            None => candidates[0],
        };

        if next != current {
            self.state = LockState::Locked { target: Some(next) };
            log::debug!("Lock cycled {:?} -> {:?} (offset {})", current, next, offset);
            self.emit(Some(next));
        }
        Ok(next)
    }

    pub fn cycle_lock<F>(&mut self, offset: i64, trace: F) -> bool
    where
        F: FnOnce() -> Vec<T>,
    {
        self.try_cycle_lock(offset, trace).is_ok()
    }

    /// Per-tick self-check of the current lock.
    ///
    /// A missing target ends the lock. An unlockable target is replaced with
    /// `cycle_lock(-1)`; if that fails the lock ends.
    pub fn reconcile<F>(&mut self, status: TargetStatus, trace: F) -> TickOutcome<T>
    where
        F: FnOnce() -> Vec<T>,
    {
        match self.state {
            LockState::Unlocked => TickOutcome::Idle,
            LockState::Locked { target: None } => {
                self.end_lock_on();
                TickOutcome::Ended
            }
            LockState::Locked { target: Some(_) } => match status {
                TargetStatus::Lockable => TickOutcome::Kept,
                TargetStatus::Missing => {
                    self.end_lock_on();
                    TickOutcome::Ended
                }
                TargetStatus::Unlockable => match self.try_cycle_lock(-1, trace) {
                    Ok(next) => TickOutcome::Cycled(next),
                    Err(e) => {
                        log::debug!("Self-heal cycle failed: {}", e);
                        self.end_lock_on();
                        TickOutcome::Ended
                    }
                },
            },
        }
    }

    /// Forget `target` without ending the lock; the next tick ends it.
    ///
    /// Used when the target is destroyed between ticks.
    pub fn forget_target(&mut self, target: T) -> bool {
        if self.state == (LockState::Locked { target: Some(target) }) {
            self.state = LockState::Locked { target: None };
            true
        } else {
            false
        }
    }

    fn emit(&mut self, target: Option<T>) {
        self.revision += 1;
        for (_, listener) in self.listeners.iter_mut() {
            listener(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<Option<u32>>>>;

    fn recording_machine() -> (LockMachine<u32>, Log) {
        let mut machine = LockMachine::new();
        let log: Log = Arc::default();
        let sink = log.clone();
        machine.on_lock_changed(move |t| sink.lock().unwrap().push(t));
        (machine, log)
    }

    fn events(log: &Log) -> Vec<Option<u32>> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn begin_locks_closest_and_emits() {
        let (mut m, log) = recording_machine();
        assert!(m.begin_lock_on(|| vec![7, 3, 9]));
        assert_eq!(m.state(), LockState::Locked { target: Some(7) });
        assert_eq!(events(&log), vec![Some(7)]);
    }

    #[test]
    fn begin_with_no_candidates_stays_unlocked() {
        let (mut m, log) = recording_machine();
        assert_eq!(m.try_begin_lock_on(Vec::new), Err(LockError::QueryEmpty));
        assert_eq!(m.state(), LockState::Unlocked);
        assert!(events(&log).is_empty());
    }

    #[test]
    fn begin_while_locked_is_rejected() {
        let (mut m, log) = recording_machine();
        m.begin_lock_on(|| vec![1]);
        let mut traced = false;
        let result = m.try_begin_lock_on(|| {
            traced = true;
            vec![2]
        });
        assert_eq!(result, Err(LockError::InvalidTransition));
        assert!(!traced);
        assert_eq!(m.target(), Some(1));
        assert_eq!(events(&log), vec![Some(1)]);
    }

    #[test]
    fn end_is_idempotent() {
        let (mut m, log) = recording_machine();
        m.end_lock_on();
        assert!(events(&log).is_empty());

        m.begin_lock_on(|| vec![4]);
        m.end_lock_on();
        m.end_lock_on();
        assert_eq!(events(&log), vec![Some(4), None]);
        assert_eq!(m.state(), LockState::Unlocked);
    }

    #[test]
    fn cycle_walks_both_ways_with_wrap() {
        let (mut m, _log) = recording_machine();
        m.begin_lock_on(|| vec![10, 20, 30]);
        assert_eq!(m.try_cycle_lock(1, || vec![10, 20, 30]), Ok(20));
        assert_eq!(m.try_cycle_lock(1, || vec![10, 20, 30]), Ok(30));
        assert_eq!(m.try_cycle_lock(1, || vec![10, 20, 30]), Ok(10));
        assert_eq!(m.try_cycle_lock(-1, || vec![10, 20, 30]), Ok(30));
    }

    #[test]
    fn cycle_adopts_closest_when_current_missing() {
        let (mut m, log) = recording_machine();
        m.begin_lock_on(|| vec![5]);
        assert_eq!(m.try_cycle_lock(1, || vec![8, 6]), Ok(8));
        assert_eq!(m.target(), Some(8));
        assert_eq!(events(&log), vec![Some(5), Some(8)]);
    }

    #[test]
    fn cycle_to_same_target_emits_nothing() {
        let (mut m, log) = recording_machine();
        m.begin_lock_on(|| vec![5]);
        assert_eq!(m.try_cycle_lock(1, || vec![5]), Ok(5));
        assert_eq!(m.try_cycle_lock(3, || vec![5, 6, 7]), Ok(5));
        assert_eq!(events(&log), vec![Some(5)]);
    }

    #[test]
    fn cycle_with_empty_trace_unlocks() {
        let (mut m, log) = recording_machine();
        m.begin_lock_on(|| vec![5]);
        assert!(!m.cycle_lock(1, Vec::new));
        assert_eq!(m.state(), LockState::Unlocked);
        assert_eq!(events(&log), vec![Some(5), None]);
    }

    #[test]
    fn cycle_requires_lock() {
        let (mut m, log) = recording_machine();
        assert_eq!(m.try_cycle_lock(1, || vec![1]), Err(LockError::InvalidTransition));
        assert!(events(&log).is_empty());
    }

    #[test]
    fn reconcile_cycles_away_from_unlockable_target() {
        let (mut m, log) = recording_machine();
        m.begin_lock_on(|| vec![1, 2, 3, 4]);
        // 1 is now unlockable so the trace no longer contains it
        let outcome = m.reconcile(TargetStatus::Unlockable, || vec![2, 3, 4]);
        assert_eq!(outcome, TickOutcome::Cycled(2));
        assert_eq!(events(&log), vec![Some(1), Some(2)]);
    }

    #[test]
    fn reconcile_ends_when_nothing_left() {
        let (mut m, log) = recording_machine();
        m.begin_lock_on(|| vec![1]);
        assert_eq!(m.reconcile(TargetStatus::Unlockable, Vec::new), TickOutcome::Ended);
        assert_eq!(m.state(), LockState::Unlocked);
        assert_eq!(events(&log), vec![Some(1), None]);
    }

    #[test]
    fn reconcile_ends_on_missing_target() {
        let (mut m, log) = recording_machine();
        m.begin_lock_on(|| vec![1, 2]);
        let outcome = m.reconcile(TargetStatus::Missing, || vec![2]);
        assert_eq!(outcome, TickOutcome::Ended);
        assert_eq!(events(&log), vec![Some(1), None]);
    }

    #[test]
    fn reconcile_keeps_valid_lock_and_ignores_unlocked() {
        let (mut m, _log) = recording_machine();
        assert_eq!(m.reconcile(TargetStatus::Lockable, Vec::new), TickOutcome::Idle);
        m.begin_lock_on(|| vec![1]);
        assert_eq!(m.reconcile(TargetStatus::Lockable, Vec::new), TickOutcome::Kept);
        assert_eq!(m.target(), Some(1));
    }

    #[test]
    fn forgotten_target_ends_on_next_tick() {
        let (mut m, log) = recording_machine();
        m.begin_lock_on(|| vec![1]);
        assert!(m.forget_target(1));
        assert!(m.is_locked());
        assert_eq!(m.target(), None);
        assert_eq!(m.try_cycle_lock(1, || vec![2]), Err(LockError::TargetInvalidated));

        assert_eq!(m.reconcile(TargetStatus::Lockable, Vec::new), TickOutcome::Ended);
        assert_eq!(events(&log), vec![Some(1), None]);
    }

    #[test]
    fn listeners_run_in_registration_order_and_can_be_removed() {
        let mut m: LockMachine<u32> = LockMachine::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let a = order.clone();
        let b = order.clone();
        let first = m.on_lock_changed(move |_| a.lock().unwrap().push("first"));
        m.on_lock_changed(move |_| b.lock().unwrap().push("second"));

        m.begin_lock_on(|| vec![1]);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);

        assert!(m.remove_listener(first));
        assert!(!m.remove_listener(first));
        m.end_lock_on();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "second"]);
        assert_eq!(m.revision(), 2);
    }
}
