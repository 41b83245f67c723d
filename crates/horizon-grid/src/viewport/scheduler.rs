//! Debounced render requests.

use std::time::{Duration, Instant};

use horizon_grid_core::{DebounceTimer, TimerId};

use crate::options::ViewportOptions;

/// Coalesces render requests into one pending request.
///
/// Each `request` supersedes the previous one, so a burst of scroll events
/// produces a single render once the burst settles.
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use horizon_grid::viewport::RenderScheduler;
///
/// let mut scheduler = RenderScheduler::new(Duration::from_millis(50));
/// let start = Instant::now();
/// scheduler.request(start);
/// scheduler.request(start + Duration::from_millis(30));
///
/// assert!(!scheduler.poll(start + Duration::from_millis(60)));
/// assert!(scheduler.poll(start + Duration::from_millis(80)));
/// ```
#[derive(Debug)]
pub struct RenderScheduler {
    timer: DebounceTimer,
}

impl RenderScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            timer: DebounceTimer::new(delay),
        }
    }

    /// Uses `render_delay_ms` from the viewport options.
    pub fn from_options(options: &ViewportOptions) -> Self {
        Self::new(Duration::from_millis(options.render_delay_ms))
    }

    /// Requests a render after the configured delay, replacing any pending
    /// request.
    pub fn request(&mut self, now: Instant) -> TimerId {
        self.timer.schedule(now)
    }

    /// Requests a render with no delay, e.g. after a data change.
    pub fn request_immediate(&mut self, now: Instant) -> TimerId {
        self.timer.schedule_after(now, Duration::ZERO)
    }

    /// Cancels the pending request. Returns `false` if none was pending.
    pub fn cancel(&mut self) -> bool {
        self.timer.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Returns `true` once when the pending request is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.timer.poll(now).is_some()
    }
}
