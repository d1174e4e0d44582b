//! Delayed UI actions with explicit cancellation.
//!
//! The one timer-like behavior in the pipeline — restoring a scroll offset
//! shortly after a dropdown closes — runs through this scheduler instead of
//! a fire-and-forget task. Every entry is owned by a control; removing the
//! control cancels its entries, so a disposed dropdown can never mutate a
//! window from a stale callback. Due actions are drained and applied on the
//! UI thread at the top of each tick.

use std::time::{Duration, Instant};

use crate::geometry::Offset;
use crate::tree::ControlId;

/// Handle for cancelling a scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// The actions that can be deferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Restore a scroll panel's offset (dropdown-close behavior).
    RestoreScroll { panel: ControlId, offset: Offset },
}

#[derive(Debug)]
struct Entry {
    id: TaskId,
    owner: ControlId,
    due: Instant,
    action: ScheduledAction,
}

/// Queue of pending delayed actions.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire after `delay`, owned by `owner`.
    pub fn schedule(&mut self, owner: ControlId, delay: Duration, action: ScheduledAction) -> TaskId {
        self.schedule_at(owner, Instant::now() + delay, action)
    }

    /// Schedule with an explicit due time.
    pub fn schedule_at(&mut self, owner: ControlId, due: Instant, action: ScheduledAction) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.entries.push(Entry { id, owner, due, action });
        id
    }

    /// Cancel one entry. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancel every entry owned by `owner`. Called when a control is
    /// removed from the tree.
    pub fn cancel_owned(&mut self, owner: ControlId) {
        self.entries.retain(|e| e.owner != owner);
    }

    /// Remove and return all actions due at `now`, in scheduling order.
    pub fn take_due(&mut self, now: Instant) -> Vec<ScheduledAction> {
        let mut due = Vec::new();
        let mut remaining = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.due <= now {
                due.push(entry.action);
            } else {
                remaining.push(entry);
            }
        }
        self.entries = remaining;
        due
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<ControlId> {
        let mut sm: SlotMap<ControlId, ()> = SlotMap::with_key();
        (0..n).map(|_| sm.insert(())).collect()
    }

    fn restore(panel: ControlId, y: i32) -> ScheduledAction {
        ScheduledAction::RestoreScroll { panel, offset: Offset::new(0, y) }
    }

    #[test]
    fn due_actions_fire_in_order() {
        let owner = ids(1)[0];
        let mut s = Scheduler::new();
        let now = Instant::now();
        s.schedule_at(owner, now, restore(owner, 1));
        s.schedule_at(owner, now, restore(owner, 2));
        let fired = s.take_due(now);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0], restore(owner, 1));
        assert_eq!(fired[1], restore(owner, 2));
        assert!(s.is_empty());
    }

    #[test]
    fn future_actions_stay_pending() {
        let owner = ids(1)[0];
        let mut s = Scheduler::new();
        let now = Instant::now();
        s.schedule_at(owner, now + Duration::from_millis(100), restore(owner, 5));
        assert!(s.take_due(now).is_empty());
        assert_eq!(s.pending_count(), 1);
        let fired = s.take_due(now + Duration::from_millis(100));
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn cancel_removes_entry() {
        let owner = ids(1)[0];
        let mut s = Scheduler::new();
        let now = Instant::now();
        let id = s.schedule_at(owner, now, restore(owner, 5));
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert!(s.take_due(now).is_empty());
    }

    #[test]
    fn cancel_owned_removes_only_that_owner() {
        let owners = ids(2);
        let mut s = Scheduler::new();
        let now = Instant::now();
        s.schedule_at(owners[0], now, restore(owners[0], 1));
        s.schedule_at(owners[1], now, restore(owners[1], 2));
        s.cancel_owned(owners[0]);
        let fired = s.take_due(now);
        assert_eq!(fired, vec![restore(owners[1], 2)]);
    }
}
