//! Deferred resize queue.
//!
//! Host triggers fire while the host is still processing the event that
//! caused them, when pane geometry may be mid-transition. Triggers only push
//! a request here; the requests are drained on the next turn of the event
//! loop, so every pass observes settled geometry.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::host::Trigger;

/// A resize pass requested by a host trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledApply {
    /// Trigger that requested the pass.
    pub trigger: Trigger,
}

/// A thread-safe FIFO of scheduled resize passes.
///
/// Requests are never cancelled. Redundant requests are kept; each one runs
/// a pass against the active pane at drain time.
#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: Mutex<VecDeque<ScheduledApply>>,
}

impl TaskQueue {
    /// Creates a new empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Schedules a pass.
    pub fn push(&self, request: ScheduledApply) { self.pending.lock().push_back(request); }

    /// Takes every pending request in scheduling order.
    #[must_use]
    pub fn take_all(&self) -> Vec<ScheduledApply> { self.pending.lock().drain(..).collect() }

    /// Returns the number of pending requests.
    #[must_use]
    pub fn len(&self) -> usize { self.pending.lock().len() }

    /// Returns true if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.pending.lock().is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_all_preserves_order_and_empties_queue() {
        let queue = TaskQueue::new();
        queue.push(ScheduledApply { trigger: Trigger::FocusChanged });
        queue.push(ScheduledApply { trigger: Trigger::ContentEntered });
        assert_eq!(queue.len(), 2);

        let taken = queue.take_all();
        assert_eq!(taken[0].trigger, Trigger::FocusChanged);
        assert_eq!(taken[1].trigger, Trigger::ContentEntered);
        assert!(queue.is_empty());
        assert!(queue.take_all().is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let queue = TaskQueue::new();
        for _ in 0..3 {
            queue.push(ScheduledApply { trigger: Trigger::CanvasResized });
        }
        assert_eq!(queue.take_all().len(), 3);
    }
}
