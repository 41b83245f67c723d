//! The data view: the row list a grid renders.
//!
//! `DataView` owns an [`ItemStore`] and the projection rules (filter, sort,
//! grouping, aggregation, paging). Every mutation updates the store or the
//! rules and then refreshes: the row list is recomputed, diffed against the
//! previous one, and the differences are announced through
//! [`DataViewSignals`].
//!
//! # Example
//!
//! ```
//! use horizon_grid::model::{DataView, GroupingRule};
//! use horizon_grid::options::DataViewOptions;
//! use serde_json::json;
//!
//! let options = DataViewOptions {
//!     group_metadata: Some(Default::default()),
//!     ..Default::default()
//! };
//! let mut view = DataView::<serde_json::Value>::with_options(options).unwrap();
//! view.signals().row_count_changed.connect(|change| {
//!     println!("rows: {} -> {}", change.previous, change.current);
//! });
//!
//! view.set_items(vec![
//!     json!({"id": 0, "val": "a"}),
//!     json!({"id": 1, "val": "a"}),
//!     json!({"id": 2, "val": "b"}),
//! ])
//! .unwrap();
//! view.set_grouping(GroupingRule::by_field("val")).unwrap();
//! assert_eq!(view.len(), 5);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::targets;

use super::aggregator::Aggregator;
use super::diff::DiffEngine;
use super::events::{ChangeSource, DataViewSignals, PagingInfoChanged, RowCountChanged, RowsChanged};
use super::group::{GroupHeader, GroupingRule, Row};
use super::item::{Item, ItemId};
use super::item_store::ItemStore;
use super::metadata::{DefaultGroupMetadataProvider, GroupMetadataProvider, RowMetadata};
use super::paging::{PagingInfo, PagingPolicy};
use super::projector::{FilterFn, Projector, RefreshHints};
use super::value::Value;
use crate::error::{DataViewError, Result};
use crate::options::DataViewOptions;

/// Item comparator used by [`DataView::sort`].
pub type SortComparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

enum SortKey<T> {
    Comparator(SortComparator<T>),
    Field(String),
}

/// A filtered, sorted, grouped, and paged view over a set of items.
///
/// `A` is the type of the filter arguments passed to the filter predicate.
pub struct DataView<T, A = ()> {
    store: ItemStore<T>,
    projector: Projector<T, A>,
    paging: PagingPolicy,
    diff: DiffEngine,
    /// The displayed row list.
    rows: Vec<Row<T>>,
    groups: Vec<Arc<GroupHeader>>,
    filtered: Vec<Arc<T>>,
    /// Item id -> displayed row, built on first lookup after a refresh.
    row_by_id: RwLock<Option<HashMap<ItemId, usize>>>,
    sort: Option<(SortKey<T>, bool)>,
    hints: RefreshHints,
    suspended: bool,
    /// Bumped by every mutation; a refresh at `projected` recomputes nothing.
    generation: u64,
    projected: Option<u64>,
    last_paging: PagingInfo,
    metadata_provider: Option<Box<dyn GroupMetadataProvider>>,
    signals: DataViewSignals,
}

impl<T: Item, A> Default for DataView<T, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Item, A> DataView<T, A> {
    /// Creates an empty view with default options.
    pub fn new() -> Self {
        Self::build(&DataViewOptions::default())
    }

    /// Creates an empty view from validated options.
    pub fn with_options(options: DataViewOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self::build(&options))
    }

    fn build(options: &DataViewOptions) -> Self {
        let metadata_provider = options.group_metadata.clone().map(|group| {
            Box::new(DefaultGroupMetadataProvider::new(group)) as Box<dyn GroupMetadataProvider>
        });
        Self {
            store: ItemStore::with_id_field(options.id_field.clone()),
            projector: Projector::new(options.inline_filters),
            paging: PagingPolicy::default(),
            diff: DiffEngine::new(),
            rows: Vec::new(),
            groups: Vec::new(),
            filtered: Vec::new(),
            row_by_id: RwLock::new(None),
            sort: None,
            hints: RefreshHints::default(),
            suspended: false,
            generation: 0,
            projected: None,
            last_paging: PagingPolicy::default().info(),
            metadata_provider,
            signals: DataViewSignals::new(),
        }
    }

    /// Installs the provider that supplies render hints for group rows.
    pub fn set_group_metadata_provider<P>(&mut self, provider: P)
    where
        P: GroupMetadataProvider + 'static,
    {
        self.metadata_provider = Some(Box::new(provider));
    }

    /// Change notifications.
    pub fn signals(&self) -> &DataViewSignals {
        &self.signals
    }

    /// The store's id field.
    pub fn id_field(&self) -> &str {
        self.store.id_field()
    }

    // -------------------------------------------------------------------------
    // Batching
    // -------------------------------------------------------------------------

    /// Suspends refreshes until [`end_update`](Self::end_update).
    ///
    /// Calls do not nest: one `end_update` resumes regardless of how many
    /// `begin_update` calls preceded it.
    pub fn begin_update(&mut self) {
        self.suspended = true;
    }

    /// Resumes refreshes and performs exactly one.
    pub fn end_update(&mut self) {
        self.suspended = false;
        self.refresh_with(ChangeSource::EndUpdate);
    }

    /// Whether refreshes are suspended.
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    // -------------------------------------------------------------------------
    // Row access
    // -------------------------------------------------------------------------

    /// Number of displayed rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The displayed row at `row`.
    pub fn get_item(&self, row: usize) -> Option<&Row<T>> {
        self.rows.get(row)
    }

    /// The full displayed row list.
    pub fn rows(&self) -> &[Row<T>] {
        &self.rows
    }

    /// Render hints for group rows; `None` for item rows or out of range.
    pub fn get_item_metadata(&self, row: usize) -> Option<RowMetadata> {
        let provider = self.metadata_provider.as_ref()?;
        match self.rows.get(row)? {
            Row::Item(_) => None,
            Row::GroupHeader(group) => Some(provider.group_row_metadata(group)),
            Row::GroupTotals(totals) => Some(provider.totals_row_metadata(totals)),
        }
    }

    /// All items in store order, ignoring filter and paging.
    pub fn get_items(&self) -> &[Arc<T>] {
        self.store.items()
    }

    /// Items that passed the filter on the current page, in display order
    /// before grouping.
    pub fn get_filtered_items(&self) -> &[Arc<T>] {
        &self.filtered
    }

    /// Groups of the current row list, in display order.
    pub fn get_groups(&self) -> &[Arc<GroupHeader>] {
        &self.groups
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// Store position of the item with `id`.
    pub fn get_idx_by_id(&self, id: &ItemId) -> Option<usize> {
        self.store.get_index_by_id(id)
    }

    /// The item at a store position.
    pub fn get_item_by_idx(&self, idx: usize) -> Option<&Arc<T>> {
        self.store.get(idx)
    }

    pub fn get_item_by_id(&self, id: &ItemId) -> Option<&Arc<T>> {
        self.store.get_item_by_id(id)
    }

    /// Displayed row of the item with `id`, or `None` when it is filtered
    /// out, off the current page, or inside a collapsed group.
    pub fn get_row_by_id(&self, id: &ItemId) -> Option<usize> {
        if let Some(index) = self.row_by_id.read().as_ref() {
            return index.get(id).copied();
        }
        let mut guard = self.row_by_id.write();
        guard
            .get_or_insert_with(|| self.build_row_index())
            .get(id)
            .copied()
    }

    /// Displayed rows for the given ids, skipping ids that are not displayed.
    pub fn map_ids_to_rows(&self, ids: &[ItemId]) -> Vec<usize> {
        ids.iter().filter_map(|id| self.get_row_by_id(id)).collect()
    }

    /// Item ids for the given rows, skipping group rows and out-of-range rows.
    pub fn map_rows_to_ids(&self, rows: &[usize]) -> Vec<ItemId> {
        rows.iter()
            .filter_map(|&row| self.rows.get(row)?.as_item())
            .filter_map(|item| self.store.id_of(item))
            .collect()
    }

    fn build_row_index(&self) -> HashMap<ItemId, usize> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(row, entry)| {
                let id = self.store.id_of(entry.as_item()?)?;
                Some((id, row))
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Item mutation
    // -------------------------------------------------------------------------

    /// Replaces every item.
    ///
    /// Rows that keep the same id at the same position are not reported as
    /// changed; use [`update_item`](Self::update_item) for content edits.
    pub fn set_items(&mut self, items: Vec<T>) -> Result<()> {
        self.store.set_items(items)?;
        self.items_changed();
        Ok(())
    }

    /// Replaces every item and switches the id field.
    pub fn set_items_with_id_field(&mut self, items: Vec<T>, id_field: &str) -> Result<()> {
        self.store.set_items_with_id_field(items, id_field)?;
        self.items_changed();
        Ok(())
    }

    /// Inserts an item at a store position.
    pub fn insert_item(&mut self, index: usize, item: T) -> Result<()> {
        self.store.insert_at(index, item)?;
        self.items_changed();
        Ok(())
    }

    /// Inserts several items at a store position, keeping their order.
    pub fn insert_items(&mut self, index: usize, items: Vec<T>) -> Result<()> {
        self.store.insert_many(index, items)?;
        self.items_changed();
        Ok(())
    }

    /// Appends an item. The current sort is not re-applied.
    pub fn add_item(&mut self, item: T) -> Result<()> {
        self.store.append(item)?;
        self.items_changed();
        Ok(())
    }

    pub fn add_items(&mut self, items: Vec<T>) -> Result<()> {
        let len = self.store.len();
        self.store.insert_many(len, items)?;
        self.items_changed();
        Ok(())
    }

    /// Replaces the item with `id`; its row is reported as changed.
    pub fn update_item(&mut self, id: &ItemId, item: T) -> Result<()> {
        self.store.update(id, item)?;
        self.diff.mark_updated(id.clone());
        self.items_changed();
        Ok(())
    }

    /// Replaces several items by id. `ids` and `items` must be the same length.
    pub fn update_items(&mut self, ids: &[ItemId], items: Vec<T>) -> Result<()> {
        self.store.update_many(ids, items)?;
        for id in ids {
            self.diff.mark_updated(id.clone());
        }
        self.items_changed();
        Ok(())
    }

    /// Removes the item with `id`.
    pub fn delete_item(&mut self, id: &ItemId) -> Result<Arc<T>> {
        let removed = self.store.delete_by_id(id)?;
        self.items_changed();
        Ok(removed)
    }

    /// Removes several items by id, returning them in argument order.
    pub fn delete_items(&mut self, ids: &[ItemId]) -> Result<Vec<Arc<T>>> {
        let removed = self.store.delete_many(ids)?;
        self.items_changed();
        Ok(removed)
    }

    fn items_changed(&mut self) {
        self.projector.invalidate_filter_cache();
        self.invalidate();
    }

    // -------------------------------------------------------------------------
    // Filtering and sorting
    // -------------------------------------------------------------------------

    /// Sets the filter predicate.
    pub fn set_filter<F>(&mut self, filter: F)
    where
        F: Fn(&T, Option<&A>) -> bool + Send + Sync + 'static,
    {
        let filter: FilterFn<T, A> = Arc::new(filter);
        self.projector.set_filter(Some(filter));
        self.projector.invalidate_filter_cache();
        self.invalidate();
    }

    /// Removes the filter.
    pub fn clear_filter(&mut self) {
        self.projector.set_filter(None);
        self.invalidate();
    }

    /// Sets the arguments passed to the filter predicate.
    ///
    /// Pair with [`set_refresh_hints`](Self::set_refresh_hints) when the
    /// change only narrows or only widens the result.
    pub fn set_filter_args(&mut self, args: A) {
        self.projector.set_filter_args(Some(args));
        self.invalidate();
    }

    pub fn get_filter_args(&self) -> Option<&A> {
        self.projector.filter_args()
    }

    /// Sorts the store with `comparator`. Stable in both directions.
    pub fn sort<F>(&mut self, comparator: F, ascending: bool)
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.sort = Some((SortKey::Comparator(Arc::new(comparator)), ascending));
        self.apply_sort();
    }

    /// Sorts the store by one field's [`Value`] order.
    pub fn sort_by_field(&mut self, field: impl Into<String>, ascending: bool) {
        self.sort = Some((SortKey::Field(field.into()), ascending));
        self.apply_sort();
    }

    /// Re-applies the last sort, e.g. after appending items.
    pub fn re_sort(&mut self) {
        if self.sort.is_some() {
            self.apply_sort();
        }
    }

    fn apply_sort(&mut self) {
        match &self.sort {
            Some((SortKey::Comparator(compare), ascending)) => {
                self.store.sort(|a, b| compare(a, b), *ascending);
            }
            Some((SortKey::Field(field), ascending)) => {
                self.store.sort_by_field(field, *ascending);
            }
            None => return,
        }
        self.items_changed();
    }

    // -------------------------------------------------------------------------
    // Grouping
    // -------------------------------------------------------------------------

    /// Groups by the value `getter` returns. Groups keep first-seen order.
    pub fn group_by<F>(&mut self, getter: F) -> Result<()>
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.set_grouping(GroupingRule::new(getter))
    }

    /// Groups by a full rule. Requires a group metadata provider.
    pub fn set_grouping(&mut self, rule: GroupingRule<T>) -> Result<()> {
        if self.metadata_provider.is_none() {
            tracing::warn!(target: targets::DATA_VIEW, "grouping requested without a group metadata provider");
            return Err(DataViewError::MissingGroupMetadataProvider);
        }
        self.projector.set_grouping(Some(rule));
        self.invalidate();
        Ok(())
    }

    /// Removes grouping.
    pub fn clear_grouping(&mut self) {
        if self.projector.grouping().is_some() {
            self.projector.set_grouping(None);
            self.invalidate();
        }
    }

    /// Sets the aggregators run for each group.
    ///
    /// With `include_collapsed`, collapsed groups are aggregated and show
    /// their totals row too.
    pub fn set_aggregators(&mut self, aggregators: Vec<Box<dyn Aggregator<T>>>, include_collapsed: bool) {
        self.projector.set_aggregators(aggregators, include_collapsed);
        self.invalidate();
    }

    pub fn collapse_group(&mut self, value: impl Into<Value>) {
        self.projector.set_collapsed(value.into(), true);
        self.invalidate();
    }

    pub fn expand_group(&mut self, value: impl Into<Value>) {
        self.projector.set_collapsed(value.into(), false);
        self.invalidate();
    }

    /// Collapses every group, including groups that appear later.
    pub fn collapse_all_groups(&mut self) {
        self.projector.set_all_collapsed(true);
        self.invalidate();
    }

    pub fn expand_all_groups(&mut self) {
        self.projector.set_all_collapsed(false);
        self.invalidate();
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    /// Sets page size and number. A page size of `0` disables paging. The page
    /// number is clamped to the last page.
    pub fn set_paging(&mut self, page_size: usize, page_num: usize) {
        self.paging.set(page_size, page_num);
        self.invalidate();
    }

    pub fn get_paging_info(&self) -> PagingInfo {
        self.paging.info()
    }

    // -------------------------------------------------------------------------
    // Refresh
    // -------------------------------------------------------------------------

    /// Hints for the next refresh only.
    pub fn set_refresh_hints(&mut self, hints: RefreshHints) {
        self.hints = hints;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Marks the row list stale and refreshes.
    ///
    /// Call this after state captured by the filter, sort, or grouping
    /// closures changed outside the view.
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.refresh();
    }

    /// Recomputes the row list and emits whatever changed. Does nothing while
    /// suspended or when nothing changed since the last refresh.
    pub fn refresh(&mut self) {
        if self.suspended {
            return;
        }
        self.refresh_with(ChangeSource::Refresh);
    }

    fn refresh_with(&mut self, source: ChangeSource) {
        if self.projected == Some(self.generation) {
            return;
        }
        self.projected = Some(self.generation);
        let _span = PerfSpan::new("data_view_refresh");
        let hints = std::mem::take(&mut self.hints);

        let mut projection = self.projector.project(self.store.items(), self.paging.window(), &hints);
        if self.paging.update_total(projection.total_rows) {
            // The requested page no longer exists; project the clamped one.
            let rerun = RefreshHints {
                is_filter_unchanged: true,
                ..hints
            };
            projection = self.projector.project(self.store.items(), self.paging.window(), &rerun);
        }

        let previous_len = self.rows.len();
        let changed = self.diff.diff(
            &self.rows,
            &projection.rows,
            |item| self.store.id_of(item),
            hints.ignore_diffs_before,
            hints.ignore_diffs_after,
        );

        self.rows = projection.rows;
        self.groups = projection.groups;
        self.filtered = projection.filtered;
        *self.row_by_id.get_mut() = None;
        self.diff.clear();

        let info = self.paging.info();
        tracing::debug!(
            target: targets::DATA_VIEW,
            rows = self.rows.len(),
            total_rows = info.total_rows,
            changed = changed.len(),
            ?source,
            "refreshed"
        );

        if (info.page_size, info.page_num, info.total_rows)
            != (self.last_paging.page_size, self.last_paging.page_num, self.last_paging.total_rows)
        {
            self.last_paging = info;
            self.signals.paging_info_changed.emit(PagingInfoChanged { info, source });
        }
        if previous_len != self.rows.len() {
            self.signals.row_count_changed.emit(RowCountChanged {
                previous: previous_len,
                current: self.rows.len(),
                source,
            });
        }
        if !changed.is_empty() {
            self.signals.rows_changed.emit(RowsChanged { rows: changed, source });
        }
    }
}

static_assertions::assert_impl_all!(DataView<super::Record>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use parking_lot::Mutex;

    fn rec(id: i64, val: &str) -> Record {
        Record::new().with("id", id).with("val", val)
    }

    fn sample() -> Vec<Record> {
        vec![rec(0, "a"), rec(1, "a"), rec(2, "b")]
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut view: DataView<Record> = DataView::new();
        view.set_items(sample()).unwrap();

        let fired = Arc::new(Mutex::new(0));
        let f = fired.clone();
        view.signals().rows_changed.connect(move |_| *f.lock() += 1);
        let f = fired.clone();
        view.signals().row_count_changed.connect(move |_| *f.lock() += 1);
        let f = fired.clone();
        view.signals().paging_info_changed.connect(move |_| *f.lock() += 1);

        view.refresh();
        view.refresh();
        assert_eq!(*fired.lock(), 0);
    }

    #[test]
    fn test_group_by_requires_provider() {
        let mut view: DataView<Record> = DataView::new();
        let err = view.group_by(|item| item.field("val")).unwrap_err();
        assert!(matches!(err, DataViewError::MissingGroupMetadataProvider));
        assert_eq!(err.kind(), crate::error::ErrorKind::UsageMisuse);
    }

    #[test]
    fn test_item_metadata() {
        let mut view: DataView<Record> = DataView::new();
        view.set_group_metadata_provider(DefaultGroupMetadataProvider::default());
        view.set_items(sample()).unwrap();
        view.set_grouping(GroupingRule::by_field("val")).unwrap();

        assert!(view.get_item_metadata(0).is_some());
        assert!(view.get_item_metadata(1).is_none());
        assert!(view.get_item_metadata(99).is_none());
    }

    #[test]
    fn test_row_lookup_tracks_refresh() {
        let mut view: DataView<Record> = DataView::new();
        view.set_items(sample()).unwrap();
        assert_eq!(view.get_row_by_id(&ItemId::from(2)), Some(2));

        view.set_filter(|item, _| item.field("val") == Value::from("b"));
        assert_eq!(view.get_row_by_id(&ItemId::from(2)), Some(0));
        assert_eq!(view.get_row_by_id(&ItemId::from(0)), None);
        // Filtered-out items keep their store index.
        assert_eq!(view.get_idx_by_id(&ItemId::from(0)), Some(0));

        assert_eq!(view.map_rows_to_ids(&[0, 5]), vec![ItemId::from(2)]);
        assert_eq!(view.map_ids_to_rows(&[ItemId::from(0), ItemId::from(2)]), vec![0]);
    }

    #[test]
    fn test_failed_mutation_emits_nothing() {
        let mut view: DataView<Record> = DataView::new();
        view.set_items(sample()).unwrap();
        let fired = Arc::new(Mutex::new(0));
        let f = fired.clone();
        view.signals().row_count_changed.connect(move |_| *f.lock() += 1);

        let err = view.add_item(rec(1, "dup")).unwrap_err();
        assert!(matches!(err, DataViewError::DuplicateId { .. }));
        assert_eq!(view.len(), 3);
        assert_eq!(*fired.lock(), 0);
    }

    #[test]
    fn test_re_sort_after_append() {
        let mut view: DataView<Record> = DataView::new();
        view.set_items(sample()).unwrap();
        view.sort_by_field("id", false);
        view.add_item(rec(7, "c")).unwrap();
        assert_eq!(view.map_rows_to_ids(&[0]), vec![ItemId::from(2)]);

        view.re_sort();
        assert_eq!(view.map_rows_to_ids(&[0]), vec![ItemId::from(7)]);
    }
}
