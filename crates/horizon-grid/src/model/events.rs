//! Change notifications emitted by a data view.

use horizon_grid_core::Signal;

use super::paging::PagingInfo;

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// A refresh caused directly by a mutation or an explicit `refresh()`.
    Refresh,
    /// The single refresh performed by `end_update()`.
    EndUpdate,
}

/// Displayed positions whose content changed, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowsChanged {
    pub rows: Vec<usize>,
    pub source: ChangeSource,
}

/// The displayed row count changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCountChanged {
    pub previous: usize,
    pub current: usize,
    pub source: ChangeSource,
}

/// The effective paging state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingInfoChanged {
    pub info: PagingInfo,
    pub source: ChangeSource,
}

/// Signals emitted by [`DataView`](super::DataView).
///
/// Within one refresh they fire in this order: paging, row count, rows.
/// A rendering layer typically resizes on `row_count_changed` and then
/// invalidates the rows reported by `rows_changed`.
pub struct DataViewSignals {
    /// Emitted when the diff after a refresh is non-empty.
    pub rows_changed: Signal<RowsChanged>,

    /// Emitted when the number of displayed rows changes.
    pub row_count_changed: Signal<RowCountChanged>,

    /// Emitted when page size, page number, or filtered total changes.
    pub paging_info_changed: Signal<PagingInfoChanged>,
}

impl Default for DataViewSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl DataViewSignals {
    pub fn new() -> Self {
        Self {
            rows_changed: Signal::new(),
            row_count_changed: Signal::new(),
            paging_info_changed: Signal::new(),
        }
    }

    /// Blocks or unblocks all three signals at once.
    pub fn set_blocked(&self, blocked: bool) {
        self.rows_changed.set_blocked(blocked);
        self.row_count_changed.set_blocked(blocked);
        self.paging_info_changed.set_blocked(blocked);
    }
}
