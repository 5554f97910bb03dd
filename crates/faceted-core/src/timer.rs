//! Timer system for faceted.
//!
//! Provides one-shot timers and a single-slot debounce primitive. There is
//! no internal event loop: the host pumps [`TimerService::fire_due`] from
//! its own tick (and can sleep for [`TimerService::time_until_next`]).
//! Every operation takes an explicit `Instant` so behavior is deterministic
//! under test.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::TimerError;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer should fire.
    deadline: Instant,
    /// Whether this timer is active.
    active: bool,
}

/// An entry in the timer queue (min-heap by deadline).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    deadline: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.deadline.cmp(&self.deadline)
    }
}

/// Manages one-shot timers.
///
/// Cancelled timers stay in the queue until they reach the front; the
/// stale entries are skipped there.
pub struct TimerService {
    /// All registered timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Priority queue of pending fires (min-heap by deadline).
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerService {
    /// Create a new timer service.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Start a one-shot timer that fires `delay` after `now`.
    ///
    /// Returns the timer ID that can be used to cancel the timer.
    pub fn start(&mut self, now: Instant, delay: Duration) -> TimerId {
        let deadline = now + delay;
        let id = self.timers.insert(TimerData {
            deadline,
            active: true,
        });
        self.queue.push(TimerQueueEntry { id, deadline });
        id
    }

    /// Cancel a timer.
    ///
    /// Returns an error if the timer is unknown, already cancelled, or has
    /// already fired.
    pub fn cancel(&mut self, id: TimerId) -> Result<(), TimerError> {
        if self.timers.remove(id).is_some() {
            Ok(())
        } else {
            Err(TimerError::InvalidTimerId)
        }
    }

    /// Check if a timer is currently active.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.get(id).is_some_and(|t| t.active)
    }

    /// Get the duration from `now` until the next timer fires, if any.
    ///
    /// Returns `None` if there are no active timers, `Duration::ZERO` if a
    /// timer is already due.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        // Drop cancelled entries from the front of the queue.
        while let Some(entry) = self.queue.peek() {
            if self.timers.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }

        self.queue
            .peek()
            .map(|entry| entry.deadline.saturating_duration_since(now))
    }

    /// Fire every timer whose deadline has passed at `now`.
    ///
    /// Returns the fired timer IDs in fire order. Fired timers are removed;
    /// their IDs become invalid.
    #[tracing::instrument(skip(self), target = "faceted_core::timer", level = "trace")]
    pub fn fire_due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek() {
            if entry.deadline > now {
                break;
            }
            let entry = *entry;
            self.queue.pop();

            // Cancelled timers leave stale queue entries behind.
            if self.timers.remove(entry.id).is_none() {
                continue;
            }

            tracing::trace!(target: "faceted_core::timer", id = ?entry.id, "timer fired");
            fired.push(entry.id);
        }

        fired
    }

    /// Get the number of active timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Default for TimerService {
    fn default() -> Self {
        Self::new()
    }
}

/// A single-slot debounce handle.
///
/// At most one shot is pending at a time: [`arm`](Self::arm) cancels any
/// pending shot before scheduling a new one, so a burst of `arm` calls
/// inside the delay window produces exactly one fire, at the last call's
/// deadline.
#[derive(Debug)]
pub struct Debounce {
    delay: Duration,
    pending: Option<TimerId>,
}

impl Debounce {
    /// Create a debounce handle with the given settling delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The configured settling delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule (or reschedule) the shot at `now + delay`.
    ///
    /// Any previously pending shot is cancelled first.
    pub fn arm(&mut self, timers: &mut TimerService, now: Instant) -> TimerId {
        if let Some(prev) = self.pending.take() {
            let _ = timers.cancel(prev);
        }
        let id = timers.start(now, self.delay);
        tracing::trace!(target: "faceted_core::timer", ?id, delay = ?self.delay, "debounce armed");
        self.pending = Some(id);
        id
    }

    /// Cancel the pending shot, if any.
    pub fn cancel(&mut self, timers: &mut TimerService) {
        if let Some(prev) = self.pending.take() {
            let _ = timers.cancel(prev);
        }
    }

    /// Whether a shot is currently pending.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume a fired timer ID.
    ///
    /// Returns `true` iff `id` is this debounce's pending shot, clearing it.
    /// Call this for each ID returned by [`TimerService::fire_due`].
    pub fn acknowledge(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerService::new();
        let t0 = Instant::now();

        let id = timers.start(t0, ms(100));
        assert!(timers.fire_due(t0 + ms(50)).is_empty());

        let fired = timers.fire_due(t0 + ms(100));
        assert_eq!(fired, vec![id]);
        assert!(!timers.is_active(id));
        assert!(timers.fire_due(t0 + ms(500)).is_empty());
    }

    #[test]
    fn test_cancel_prevents_fire() {
        let mut timers = TimerService::new();
        let t0 = Instant::now();

        let id = timers.start(t0, ms(100));
        timers.cancel(id).unwrap();
        assert_eq!(timers.cancel(id), Err(TimerError::InvalidTimerId));
        assert!(timers.fire_due(t0 + ms(200)).is_empty());
    }

    #[test]
    fn test_fire_order_by_deadline() {
        let mut timers = TimerService::new();
        let t0 = Instant::now();

        let late = timers.start(t0, ms(200));
        let early = timers.start(t0, ms(100));

        assert_eq!(timers.time_until_next(t0), Some(ms(100)));
        assert_eq!(timers.fire_due(t0 + ms(300)), vec![early, late]);
    }

    #[test]
    fn test_time_until_next_skips_cancelled() {
        let mut timers = TimerService::new();
        let t0 = Instant::now();

        let early = timers.start(t0, ms(100));
        let late = timers.start(t0, ms(200));
        timers.cancel(early).unwrap();

        assert_eq!(timers.time_until_next(t0), Some(ms(200)));
        assert_eq!(timers.fire_due(t0 + ms(250)), vec![late]);
    }

    #[test]
    fn test_debounce_coalesces_bursts() {
        let mut timers = TimerService::new();
        let mut debounce = Debounce::new(ms(250));
        let t0 = Instant::now();

        let first = debounce.arm(&mut timers, t0);
        let second = debounce.arm(&mut timers, t0 + ms(100));

        // The first shot was cancelled; nothing fires at its deadline.
        assert!(timers.fire_due(t0 + ms(250)).is_empty());

        let fired = timers.fire_due(t0 + ms(350));
        assert_eq!(fired, vec![second]);
        assert!(!debounce.acknowledge(first));
        assert!(debounce.acknowledge(second));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_debounce_cancel() {
        let mut timers = TimerService::new();
        let mut debounce = Debounce::new(ms(250));
        let t0 = Instant::now();

        debounce.arm(&mut timers, t0);
        debounce.cancel(&mut timers);

        assert!(!debounce.is_pending());
        assert!(timers.fire_due(t0 + ms(500)).is_empty());
    }
}
