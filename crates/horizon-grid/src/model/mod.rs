//! Data model for Horizon Grid.
//!
//! This module turns a set of items into the flat row list a grid renders,
//! and reports exactly which rows changed after every mutation.
//!
//! # Core Types
//!
//! - `Item`: Field access by name; implemented for `serde_json::Value` and `Record`
//! - `ItemStore`: Ordered items with a unique id index
//! - `DataView`: Filter, sort, group, aggregate, and page over an `ItemStore`
//! - `Row`: One displayed row (item, group header, or group totals)
//! - `DataViewSignals`: Change notifications
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  ItemStore  │────>│  Projector  │────>│ DiffEngine  │
//! │  (items)    │     │ (row list)  │     │ (positions) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                v
//!                                         ┌─────────────┐
//!                                         │   Signals   │
//!                                         └─────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use horizon_grid::model::{DataView, ItemId, Record};
//!
//! let mut view: DataView<Record> = DataView::new();
//! view.signals().rows_changed.connect(|change| {
//!     println!("re-render rows {:?}", change.rows);
//! });
//!
//! view.set_items(vec![
//!     Record::new().with("id", 1).with("name", "alpha"),
//!     Record::new().with("id", 2).with("name", "beta"),
//! ])
//! .unwrap();
//! view.update_item(&ItemId::from(2), Record::new().with("id", 2).with("name", "gamma"))
//!     .unwrap();
//! ```

pub mod aggregator;
mod data_view;
mod diff;
mod events;
mod group;
mod item;
pub mod item_store;
mod metadata;
mod paging;
mod projector;
mod value;

pub use aggregator::{Aggregator, Avg, Max, Min, Sum};
pub use data_view::{DataView, SortComparator};
pub use diff::DiffEngine;
pub use events::{ChangeSource, DataViewSignals, PagingInfoChanged, RowCountChanged, RowsChanged};
pub use group::{GroupComparator, GroupHeader, GroupTotals, GroupingRule, Row, TitleFormatter, ValueGetter};
pub use item::{Item, ItemId, Record};
pub use item_store::{DEFAULT_ID_FIELD, ItemStore};
pub use metadata::{
    ColumnSpan, DefaultGroupMetadataProvider, GroupMetadataOptions, GroupMetadataProvider, RowFormatter,
    RowMetadata,
};
pub use paging::{PagingInfo, PagingPolicy};
pub use projector::{FilterFn, RefreshHints};
pub use value::Value;
