//! Prelude module for Horizon Grid.
//!
//! ```
//! use horizon_grid::prelude::*;
//! ```

// ============================================================================
// Signals
// ============================================================================

pub use crate::{ConnectionId, Signal};

// ============================================================================
// Data View
// ============================================================================

pub use crate::model::{
    Aggregator, Avg, ChangeSource, DataView, GroupHeader, GroupTotals, GroupingRule, Item, ItemId, Max, Min,
    Record, RefreshHints, Row, Sum, Value,
};

// ============================================================================
// Viewport
// ============================================================================

pub use crate::viewport::{InputSource, RenderScheduler, RowCache, ScrollInput, ViewportWindow};

// ============================================================================
// Errors and Options
// ============================================================================

pub use crate::options::{DataViewOptions, RowCacheOptions, ViewportOptions};
pub use crate::{DataViewError, ErrorKind};
