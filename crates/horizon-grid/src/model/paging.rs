//! Page slicing of the filtered item sequence.

use serde::{Deserialize, Serialize};

/// Effective paging state, as reported by `paging_info_changed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    /// Rows per page; `0` means paging is disabled.
    pub page_size: usize,
    /// Zero-based current page.
    pub page_num: usize,
    /// Filtered item count before slicing.
    pub total_rows: usize,
    /// Number of pages (`1` for an empty set or disabled paging).
    pub total_pages: usize,
}

/// Tracks page size and number, and keeps the page number in range.
#[derive(Debug, Clone, Copy, Default)]
pub struct PagingPolicy {
    page_size: usize,
    page_num: usize,
    total_rows: usize,
}

impl PagingPolicy {
    /// Sets page size and number. The number is clamped on the next refresh.
    pub fn set(&mut self, page_size: usize, page_num: usize) {
        self.page_size = page_size;
        self.page_num = if page_size == 0 { 0 } else { page_num };
    }

    /// Whether paging is active.
    pub fn is_enabled(&self) -> bool {
        self.page_size > 0
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_num(&self) -> usize {
        self.page_num
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// The `(offset, len)` slice of the filtered sequence for the current
    /// page, or `None` when paging is disabled.
    pub fn window(&self) -> Option<(usize, usize)> {
        self.is_enabled()
            .then(|| (self.page_num * self.page_size, self.page_size))
    }

    /// The last valid page for `total_rows` rows.
    pub fn last_page(&self, total_rows: usize) -> usize {
        if self.page_size == 0 {
            0
        } else {
            total_rows.div_ceil(self.page_size).saturating_sub(1)
        }
    }

    /// Records a new total and clamps the page number into range.
    ///
    /// Returns `true` if the page number had to move, meaning the projection
    /// was computed for a page that no longer exists.
    pub fn update_total(&mut self, total_rows: usize) -> bool {
        self.total_rows = total_rows;
        let last = self.last_page(total_rows);
        if self.page_num > last {
            self.page_num = last;
            true
        } else {
            false
        }
    }

    /// Snapshot of the effective paging state.
    pub fn info(&self) -> PagingInfo {
        let total_pages = if self.page_size == 0 {
            1
        } else {
            self.total_rows.div_ceil(self.page_size).max(1)
        };
        PagingInfo {
            page_size: self.page_size,
            page_num: self.page_num,
            total_rows: self.total_rows,
            total_pages,
        }
    }
}
