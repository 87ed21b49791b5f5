//! Handoff queue between reader threads and the consumer.
//!
//! Producers push from any thread; a single consumer drains in bounded
//! batches. The queue never blocks a producer and applies no backpressure:
//! [`DepthMonitor`] only makes a growing backlog visible in the logs.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::warn;

/// Mutex-guarded FIFO shared between producers and one consumer.
pub struct HandoffQueue<T> {
    inner: Arc<Mutex<VecDeque<T>>>,
}

impl<T> Clone for HandoffQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for HandoffQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandoffQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Append an item, returning the depth after the push.
    pub fn push(&self, item: T) -> usize {
        let mut queue = self.inner.lock();
        queue.push_back(item);
        queue.len()
    }

    /// Remove up to `max` items from the front, oldest first.
    pub fn drain_batch(&self, max: usize) -> Vec<T> {
        let mut queue = self.inner.lock();
        let n = queue.len().min(max);
        queue.drain(..n).collect()
    }

    /// Drop every queued item, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut queue = self.inner.lock();
        let n = queue.len();
        queue.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Rate-limited queue depth warning.
#[derive(Debug)]
pub struct DepthMonitor {
    threshold: usize,
    interval: Duration,
    last_warned: Option<Instant>,
}

impl DepthMonitor {
    pub fn new(threshold: usize, interval: Duration) -> Self {
        Self {
            threshold,
            interval,
            last_warned: None,
        }
    }

    /// Check `depth` at `now`; logs and returns true when a warning is due.
    pub fn observe(&mut self, depth: usize, now: Instant) -> bool {
        if depth <= self.threshold {
            return false;
        }
        if let Some(last) = self.last_warned
            && now.saturating_duration_since(last) < self.interval
        {
            return false;
        }
        self.last_warned = Some(now);
        warn!(
            depth,
            threshold = self.threshold,
            "Handoff queue backlog above threshold"
        );
        true
    }
}
