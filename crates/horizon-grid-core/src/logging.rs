//! Logging facilities for Horizon Grid.
//!
//! Horizon Grid uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // Your application code...
//! }
//! ```
//!
//! Refresh passes and render reconciliation are wrapped in [`PerfSpan`]s, so a
//! subscriber with span timing enabled shows where projection time goes.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem, e.g.
/// `RUST_LOG=horizon_grid::data_view=debug`.
pub mod targets {
    /// Core primitives target.
    pub const CORE: &str = "horizon_grid_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_grid_core::signal";
    /// Debounce timer target.
    pub const TIMER: &str = "horizon_grid_core::timer";
    /// Data view orchestration target.
    pub const DATA_VIEW: &str = "horizon_grid::data_view";
    /// Item store target.
    pub const ITEM_STORE: &str = "horizon_grid::item_store";
    /// Viewport windowing and row cache target.
    pub const VIEWPORT: &str = "horizon_grid::viewport";
    /// Performance span target.
    pub const PERF: &str = "horizon_grid::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_grid::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Trace-level logging under the core target.
#[macro_export]
macro_rules! grid_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_grid_core", $($arg)*)
    };
}
