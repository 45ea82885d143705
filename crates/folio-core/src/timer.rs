#![forbid(unsafe_code)]

//! Deterministic deferred tasks.
//!
//! The page never sleeps. Every delay (stagger, progress-bar regrow, counter
//! interval, ripple teardown) is a task in a [`TimerQueue`] keyed by the
//! host's monotonic clock. The host drains due tasks once per animation
//! frame, so delays are cooperative: ordering is exact, wall-clock precision
//! is not.
//!
//! # Invariants
//!
//! 1. Due tasks are returned in `(due, insertion)` order.
//! 2. A repeating timer fires at most once per [`drain_due`](TimerQueue::drain_due)
//!    call and is rescheduled at `now + period` (no catch-up bursts).
//! 3. A cancelled timer never fires again, including a repeating timer
//!    cancelled by the task it just produced.
//!
//! # Failure Modes
//!
//! - Zero period: clamped to [`MIN_PERIOD`] so draining always terminates.
//! - Cancelling an unknown or finished timer returns `false`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Smallest accepted repeat period.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Scheduled<T> {
    id: TimerId,
    due: Duration,
    seq: u64,
    period: Option<Duration>,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    // Reversed so the max-heap pops the earliest entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Queue of one-shot and repeating tasks.
#[derive(Debug)]
pub struct TimerQueue<T> {
    heap: BinaryHeap<Scheduled<T>>,
    next_id: u64,
    next_seq: u64,
}

impl<T: Clone> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TimerQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_id: 1,
            next_seq: 0,
        }
    }

    /// Run `task` once, `delay` after `now`.
    pub fn schedule_after(&mut self, now: Duration, delay: Duration, task: T) -> TimerId {
        self.push(now.saturating_add(delay), None, task)
    }

    /// Run `task` every `period`, first at `now + period`.
    pub fn schedule_every(&mut self, now: Duration, period: Duration, task: T) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.push(now.saturating_add(period), Some(period), task)
    }

    fn push(&mut self, due: Duration, period: Option<Duration>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.enqueue(id, due, period, task);
        id
    }

    fn enqueue(&mut self, id: TimerId, due: Duration, period: Option<Duration>, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled {
            id,
            due,
            seq,
            period,
            task,
        });
    }

    /// Cancel a timer. Returns whether anything was removed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.heap.len();
        self.heap.retain(|s| s.id != id);
        before != self.heap.len()
    }

    /// Whether `id` is still scheduled.
    #[must_use]
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.heap.iter().any(|s| s.id == id)
    }

    /// Pop every task due at or before `now`.
    ///
    /// Repeating timers are re-armed before being returned, so a task may
    /// cancel its own timer while it runs.
    pub fn drain_due(&mut self, now: Duration) -> Vec<(TimerId, T)> {
        let mut due = Vec::new();
        let mut rearm = Vec::new();
        while let Some(top) = self.heap.peek() {
            if top.due > now {
                break;
            }
            let Some(entry) = self.heap.pop() else {
                break;
            };
            if let Some(period) = entry.period {
                rearm.push((entry.id, now.saturating_add(period), period, entry.task.clone()));
            }
            due.push((entry.id, entry.task));
        }
        for (id, at, period, task) in rearm {
            self.enqueue(id, at, Some(period), task);
        }
        due
    }

    /// Earliest pending due time.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.heap.peek().map(|s| s.due)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
