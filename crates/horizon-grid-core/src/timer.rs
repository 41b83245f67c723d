//! Debounce timer for Horizon Grid.
//!
//! A [`DebounceTimer`] holds at most one pending deadline. Scheduling again
//! supersedes the previous request (last write wins), which is exactly what a
//! deferred render or a coalesced refresh needs: only the latest request
//! matters. The timer does not own a clock; callers pass `Instant`s in, so the
//! host event loop decides when to poll.

use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::TimerError;
use crate::logging::targets;

new_key_type! {
    /// A handle to one scheduled request.
    ///
    /// Handles are generational: once a request is superseded, cancelled or
    /// fired, its handle never matches again.
    pub struct TimerId;
}

/// A single-slot, last-write-wins timer.
#[derive(Debug)]
pub struct DebounceTimer {
    delay: Duration,
    timers: SlotMap<TimerId, Instant>,
    pending: Option<TimerId>,
}

impl DebounceTimer {
    /// Create a timer that fires `delay` after the latest `schedule` call.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            timers: SlotMap::with_key(),
            pending: None,
        }
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a request using the configured delay.
    pub fn schedule(&mut self, now: Instant) -> TimerId {
        self.schedule_after(now, self.delay)
    }

    /// Schedule a request with an explicit delay, superseding any pending one.
    pub fn schedule_after(&mut self, now: Instant, delay: Duration) -> TimerId {
        if let Some(previous) = self.pending.take() {
            self.timers.remove(previous);
            tracing::trace!(target: targets::TIMER, ?previous, "superseded pending request");
        }
        let id = self.timers.insert(now + delay);
        self.pending = Some(id);
        id
    }

    /// Cancel whatever is pending. Returns `true` if something was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(id) => {
                self.timers.remove(id);
                true
            }
            None => false,
        }
    }

    /// Cancel a specific request; fails if the handle is no longer current.
    pub fn cancel_handle(&mut self, id: TimerId) -> Result<(), TimerError> {
        if self.pending != Some(id) {
            return Err(TimerError::StaleHandle);
        }
        self.cancel();
        Ok(())
    }

    /// Whether a request is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The deadline of the pending request, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.and_then(|id| self.timers.get(id).copied())
    }

    /// Fire the pending request if its deadline has passed.
    ///
    /// Returns the handle that fired; the timer is idle afterwards.
    pub fn poll(&mut self, now: Instant) -> Option<TimerId> {
        let id = self.pending?;
        let due = *self.timers.get(id)?;
        if now < due {
            return None;
        }
        self.pending = None;
        self.timers.remove(id);
        crate::grid_trace!(?id, "debounce timer fired");
        Some(id)
    }
}
