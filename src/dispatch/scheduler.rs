//! Tick-driven one-shot timers.
//!
//! Nothing here sleeps or spawns: the owner calls [`Scheduler::take_due`]
//! from its tick and runs whatever came due. Handles stay valid after a
//! timer fires; cancelling a fired or unknown handle is a no-op.

use std::time::{Duration, Instant};

/// Cancellable reference to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

struct Timer<T> {
    id: u64,
    deadline: Instant,
    task: T,
}

/// One-shot timers carrying a task value of type `T`.
pub struct Scheduler<T> {
    next_id: u64,
    timers: Vec<Timer<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            timers: Vec::new(),
        }
    }

    /// Schedule `task` to come due `delay` after `now`.
    pub fn run_after(&mut self, now: Instant, delay: Duration, task: T) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        let deadline = now.checked_add(delay).unwrap_or(now);
        self.timers.push(Timer { id, deadline, task });
        TimerHandle(id)
    }

    /// Cancel a pending timer. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.timers.iter().position(|t| t.id == handle.0) {
            Some(pos) => {
                self.timers.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.id == handle.0)
    }

    /// Remove and return every task due at `now`, earliest deadline first.
    /// Timers with equal deadlines keep scheduling order.
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        if !self.timers.iter().any(|t| t.deadline <= now) {
            return Vec::new();
        }
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|t| t.deadline <= now);
        self.timers = pending;
        due.sort_by_key(|t| (t.deadline, t.id));
        due.into_iter().map(|t| t.task).collect()
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
