//! Viewport virtualization.
//!
//! A grid with far more rows than fit on screen materializes only the rows
//! near the viewport. [`ViewportWindow`] turns scroll input into a render
//! range, [`RowCache`] turns consecutive render ranges into build and drop
//! lists, and [`RenderScheduler`] coalesces bursts of render requests.
//!
//! # Example
//!
//! ```
//! use horizon_grid::options::{RowCacheOptions, ViewportOptions};
//! use horizon_grid::viewport::{InputSource, RowCache, ScrollInput, ViewportWindow};
//!
//! let mut window = ViewportWindow::new(ViewportOptions::default()).unwrap();
//! let mut cache: RowCache<String> = RowCache::new(RowCacheOptions::default()).unwrap();
//! window.set_total_rows(1000);
//!
//! let input = ScrollInput {
//!     source: InputSource::Wheel,
//!     scroll_top: 500.0,
//!     container_height: 250.0,
//! };
//! if let Some(range) = window.on_scroll(input) {
//!     assert_eq!((range.visible.top, range.visible.bottom), (20, 30));
//!     let dropped = cache.render(&range, None, |row| format!("row {row}"));
//!     assert!(dropped.is_empty());
//! }
//! ```

mod row_cache;
mod scheduler;
mod window;

pub use row_cache::{CachePlan, RowCache};
pub use scheduler::RenderScheduler;
pub use window::{InputSource, RowSpan, ScrollDirection, ScrollInput, ViewportWindow, WindowRange, compute_range};
