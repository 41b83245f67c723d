//! Horizon Grid - a headless data grid engine.
//!
//! The crate holds the parts of a data grid that do not paint: the data view
//! that filters, sorts, groups, aggregates, and pages items into a row list
//! while reporting exactly which rows changed, and the viewport logic that
//! decides which rows to materialize while scrolling.
//!
//! # Example
//!
//! ```
//! use horizon_grid::prelude::*;
//! use serde_json::json;
//!
//! let mut view: DataView<serde_json::Value> = DataView::new();
//! view.signals().row_count_changed.connect(|change| {
//!     println!("{} -> {} rows", change.previous, change.current);
//! });
//!
//! view.set_items(vec![json!({"id": 1, "n": 5}), json!({"id": 2, "n": 9})])
//!     .unwrap();
//! view.set_filter(|item, _| item.field("n").as_int() > Some(6));
//! assert_eq!(view.len(), 1);
//! ```

pub use horizon_grid_core::*;

mod error;
pub mod model;
pub mod options;
pub mod prelude;
pub mod viewport;

pub use error::{DataViewError, ErrorKind, OptionsError, Result};
