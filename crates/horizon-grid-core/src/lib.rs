//! Core primitives for Horizon Grid.
//!
//! This crate provides the small building blocks the grid engines share:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Debounce Timer**: Single pending request, last write wins
//! - **Logging**: `tracing` targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let rows_changed = Signal::<Vec<usize>>::new();
//!
//! let conn_id = rows_changed.connect(|rows| {
//!     println!("re-render rows {rows:?}");
//! });
//!
//! rows_changed.emit(vec![1, 2]);
//! rows_changed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod signal;
pub mod timer;

pub use error::{SignalError, TimerError};
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{DebounceTimer, TimerId};
