//! Materialized row tracking.
//!
//! The cache maps row positions to caller-owned handles (DOM nodes, widgets,
//! prepared text). Handles are opaque here; the cache only decides which
//! positions to build and which to drop.

use std::collections::BTreeMap;

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::targets;

use super::window::WindowRange;
use crate::error::Result;
use crate::options::RowCacheOptions;

/// What a render pass must do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachePlan {
    /// Cached rows to drop, ascending.
    pub evict: Vec<usize>,
    /// Rows to build, nearest to the visible range first.
    pub materialize: Vec<usize>,
    /// The whole cache is being rebuilt rather than patched.
    pub full_replace: bool,
}

/// Cache of materialized rows.
#[derive(Debug)]
pub struct RowCache<H> {
    options: RowCacheOptions,
    rows: BTreeMap<usize, H>,
}

impl<H> RowCache<H> {
    pub fn new(options: RowCacheOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            rows: BTreeMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, row: usize) -> bool {
        self.rows.contains_key(&row)
    }

    pub fn get(&self, row: usize) -> Option<&H> {
        self.rows.get(&row)
    }

    pub fn get_mut(&mut self, row: usize) -> Option<&mut H> {
        self.rows.get_mut(&row)
    }

    /// Cached positions, ascending.
    pub fn cached_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    /// The most rows kept for `range`.
    pub fn capacity(&self, range: &WindowRange) -> usize {
        self.options
            .min_capacity
            .max(range.visible.len() + 2 * range.buffer)
    }

    /// Plans a render pass without changing the cache.
    ///
    /// `pinned` is a row that must survive (focused or being edited).
    pub fn reconcile(&self, range: &WindowRange, pinned: Option<usize>) -> CachePlan {
        let Some(render) = range.render else {
            return CachePlan {
                evict: self.cached_rows().filter(|&row| Some(row) != pinned).collect(),
                materialize: Vec::new(),
                full_replace: !self.rows.is_empty(),
            };
        };

        let candidates: Vec<usize> = self
            .cached_rows()
            .filter(|&row| !render.contains(row) && Some(row) != pinned)
            .collect();
        let full_replace =
            !self.rows.is_empty() && candidates.len() as f64 > self.options.full_replace_ratio * self.rows.len() as f64;

        let (evict, mut materialize): (Vec<usize>, Vec<usize>) = if full_replace {
            (
                self.cached_rows().filter(|&row| Some(row) != pinned).collect(),
                render.rows().filter(|&row| Some(row) != pinned || !self.contains(row)).collect(),
            )
        } else {
            (candidates, render.rows().filter(|&row| !self.contains(row)).collect())
        };
        materialize.sort_by_key(|&row| range.visible.distance(row));

        CachePlan {
            evict,
            materialize,
            full_replace,
        }
    }

    /// Applies a plan: drops evicted rows, builds new ones with `make`, then
    /// enforces capacity. Returns every dropped handle.
    pub fn commit<F>(&mut self, plan: &CachePlan, range: &WindowRange, pinned: Option<usize>, mut make: F) -> Vec<(usize, H)>
    where
        F: FnMut(usize) -> H,
    {
        let _span = PerfSpan::new("row_cache_commit");
        let mut dropped: Vec<(usize, H)> = plan
            .evict
            .iter()
            .filter_map(|&row| self.rows.remove(&row).map(|handle| (row, handle)))
            .collect();
        for &row in &plan.materialize {
            self.rows.insert(row, make(row));
        }
        dropped.extend(self.enforce_capacity(range, pinned));

        tracing::trace!(
            target: targets::VIEWPORT,
            evicted = dropped.len(),
            materialized = plan.materialize.len(),
            full_replace = plan.full_replace,
            cached = self.rows.len(),
            "row cache committed"
        );
        dropped
    }

    /// Plans and commits in one step.
    pub fn render<F>(&mut self, range: &WindowRange, pinned: Option<usize>, make: F) -> Vec<(usize, H)>
    where
        F: FnMut(usize) -> H,
    {
        let plan = self.reconcile(range, pinned);
        self.commit(&plan, range, pinned, make)
    }

    /// Drops specific rows so the next render rebuilds them, e.g. the rows
    /// reported by `rows_changed`.
    pub fn invalidate_rows(&mut self, rows: &[usize]) -> Vec<(usize, H)> {
        rows.iter()
            .filter_map(|&row| self.rows.remove(&row).map(|handle| (row, handle)))
            .collect()
    }

    /// Drops every row.
    pub fn invalidate_all(&mut self) -> Vec<(usize, H)> {
        std::mem::take(&mut self.rows).into_iter().collect()
    }

    /// Drops rows at or past `row_count`, e.g. after `row_count_changed`.
    pub fn truncate(&mut self, row_count: usize) -> Vec<(usize, H)> {
        self.rows.split_off(&row_count).into_iter().collect()
    }

    fn enforce_capacity(&mut self, range: &WindowRange, pinned: Option<usize>) -> Vec<(usize, H)> {
        let capacity = self.capacity(range);
        if self.rows.len() <= capacity {
            return Vec::new();
        }
        let mut by_distance: Vec<usize> = self.cached_rows().filter(|&row| Some(row) != pinned).collect();
        by_distance.sort_by_key(|&row| std::cmp::Reverse(range.visible.distance(row)));

        let excess = self.rows.len() - capacity;
        by_distance
            .into_iter()
            .take(excess)
            .filter_map(|row| self.rows.remove(&row).map(|handle| (row, handle)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::{RowSpan, ScrollDirection, compute_range};

    fn cache(min_capacity: usize) -> RowCache<String> {
        RowCache::new(RowCacheOptions {
            min_capacity,
            ..Default::default()
        })
        .unwrap()
    }

    fn range(top: usize, bottom: usize, buffer: usize) -> WindowRange {
        WindowRange {
            visible: RowSpan::new(top, bottom),
            render: Some(RowSpan::new(top.saturating_sub(buffer), bottom + buffer)),
            buffer,
        }
    }

    #[test]
    fn test_initial_render_nearest_first() {
        let cache = cache(50);
        let plan = cache.reconcile(&range(5, 6, 2), None);
        assert!(plan.evict.is_empty());
        assert_eq!(plan.materialize, vec![5, 6, 4, 7, 3, 8]);
    }

    #[test]
    fn test_incremental_scroll() {
        let mut cache = cache(50);
        cache.render(&range(0, 9, 0), None, |row| format!("row {row}"));
        assert_eq!(cache.len(), 10);

        // Two rows leave, two enter: patch, not rebuild.
        let plan = cache.reconcile(&range(2, 11, 0), None);
        assert!(!plan.full_replace);
        assert_eq!(plan.evict, vec![0, 1]);
        assert_eq!(plan.materialize, vec![10, 11]);

        let dropped = cache.commit(&plan, &range(2, 11, 0), None, |row| format!("row {row}"));
        assert_eq!(dropped, vec![(0, "row 0".to_string()), (1, "row 1".to_string())]);
        assert_eq!(cache.get(11).map(String::as_str), Some("row 11"));
    }

    #[test]
    fn test_jump_rebuilds_and_keeps_pinned() {
        let mut cache = cache(50);
        cache.render(&range(0, 9, 0), None, |row| row.to_string());

        let plan = cache.reconcile(&range(100, 104, 0), Some(3));
        assert!(plan.full_replace);
        assert!(!plan.evict.contains(&3));
        assert_eq!(plan.evict.len(), 9);
        assert_eq!(plan.materialize, vec![100, 101, 102, 103, 104]);

        cache.commit(&plan, &range(100, 104, 0), Some(3), |row| row.to_string());
        assert!(cache.contains(3));
        assert_eq!(cache.len(), 6);
    }

    #[test]
    fn test_capacity_evicts_farthest() {
        let mut cache = cache(4);
        cache.render(&range(0, 3, 0), None, |row| row.to_string());
        // Patch in two more rows, which exceeds capacity 4.
        let window = range(1, 4, 0);
        let plan = CachePlan {
            evict: Vec::new(),
            materialize: vec![4, 5],
            full_replace: false,
        };
        let dropped = cache.commit(&plan, &window, None, |row| row.to_string());
        let mut dropped_rows: Vec<usize> = dropped.into_iter().map(|(row, _)| row).collect();
        dropped_rows.sort_unstable();
        assert_eq!(dropped_rows, vec![0, 5]);
        assert_eq!(cache.cached_rows().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_range_and_truncate() {
        let mut cache = cache(50);
        let window = compute_range(0.0, 100.0, 25.0, 8, ScrollDirection::Neutral, 3);
        cache.render(&window, None, |row| row.to_string());
        assert_eq!(cache.len(), 8);

        let dropped = cache.truncate(5);
        assert_eq!(dropped.len(), 3);
        assert_eq!(cache.invalidate_rows(&[0, 1, 42]).len(), 2);

        let empty = compute_range(0.0, 100.0, 25.0, 0, ScrollDirection::Neutral, 3);
        let plan = cache.reconcile(&empty, None);
        assert_eq!(plan.evict, vec![2, 3, 4]);
        assert!(plan.materialize.is_empty());
    }
}
