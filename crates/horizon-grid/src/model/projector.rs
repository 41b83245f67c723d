//! Filter, page, group, aggregate, and flatten.
//!
//! The projector turns the store's canonical item sequence into the flat row
//! list a data view displays. It owns the rules (filter, grouping,
//! aggregators, collapsed groups) but not the items; ordering comes from the
//! store, which is sorted in place.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::aggregator::Aggregator;
use super::group::{GroupHeader, GroupTotals, GroupingRule, Row};
use super::item::Item;
use super::value::Value;

/// Filter predicate. Receives the item and the current filter arguments.
pub type FilterFn<T, A> = Arc<dyn Fn(&T, Option<&A>) -> bool + Send + Sync>;

/// Hints for the next refresh. Cleared after every refresh.
///
/// The filter hints let the projector reuse the previous pass's results
/// (only when filter result caching is on): a narrowing filter re-tests only
/// items that passed before, an expanding filter only items that failed.
/// The diff bounds restrict which positions are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshHints {
    /// The filter can only reject items it accepted before.
    pub is_filter_narrowing: bool,
    /// The filter can only accept items it rejected before.
    pub is_filter_expanding: bool,
    /// The filter outcome is known not to have changed.
    pub is_filter_unchanged: bool,
    /// Skip diffing positions before this row.
    pub ignore_diffs_before: Option<usize>,
    /// Skip diffing positions after this row. The row itself is still
    /// diffed: the bound is inclusive.
    pub ignore_diffs_after: Option<usize>,
}

/// Output of one projection pass.
pub(crate) struct Projection<T> {
    pub rows: Vec<Row<T>>,
    pub groups: Vec<Arc<GroupHeader>>,
    /// Items that passed the filter and fall on the current page.
    pub filtered: Vec<Arc<T>>,
    /// Filtered count before page slicing.
    pub total_rows: usize,
}

pub(crate) struct Projector<T, A> {
    filter: Option<FilterFn<T, A>>,
    filter_args: Option<A>,
    grouping: Option<GroupingRule<T>>,
    aggregators: Vec<Box<dyn Aggregator<T>>>,
    aggregate_collapsed: bool,
    collapsed_by_default: bool,
    /// Groups whose state differs from `collapsed_by_default`.
    toggled: HashSet<Value>,
    cache_filter_results: bool,
    filter_cache: Option<Vec<bool>>,
}

impl<T: Item, A> Projector<T, A> {
    pub fn new(cache_filter_results: bool) -> Self {
        Self {
            filter: None,
            filter_args: None,
            grouping: None,
            aggregators: Vec::new(),
            aggregate_collapsed: false,
            collapsed_by_default: false,
            toggled: HashSet::new(),
            cache_filter_results,
            filter_cache: None,
        }
    }

    pub fn set_filter(&mut self, filter: Option<FilterFn<T, A>>) {
        self.filter = filter;
    }

    pub fn set_filter_args(&mut self, args: Option<A>) {
        self.filter_args = args;
    }

    pub fn filter_args(&self) -> Option<&A> {
        self.filter_args.as_ref()
    }

    pub fn set_grouping(&mut self, grouping: Option<GroupingRule<T>>) {
        self.grouping = grouping;
        self.collapsed_by_default = false;
        self.toggled.clear();
    }

    pub fn grouping(&self) -> Option<&GroupingRule<T>> {
        self.grouping.as_ref()
    }

    pub fn set_aggregators(&mut self, aggregators: Vec<Box<dyn Aggregator<T>>>, include_collapsed: bool) {
        self.aggregators = aggregators;
        self.aggregate_collapsed = include_collapsed;
    }

    pub fn is_collapsed(&self, value: &Value) -> bool {
        self.collapsed_by_default ^ self.toggled.contains(value)
    }

    pub fn set_collapsed(&mut self, value: Value, collapsed: bool) {
        if collapsed == self.collapsed_by_default {
            self.toggled.remove(&value);
        } else {
            self.toggled.insert(value);
        }
    }

    pub fn set_all_collapsed(&mut self, collapsed: bool) {
        self.collapsed_by_default = collapsed;
        self.toggled.clear();
    }

    /// Drops cached filter results; required whenever item positions or
    /// contents change.
    pub fn invalidate_filter_cache(&mut self) {
        self.filter_cache = None;
    }

    /// Runs every pass over `items`.
    ///
    /// `page` is the `(offset, len)` slice of the filtered sequence to keep.
    pub fn project(
        &mut self,
        items: &[Arc<T>],
        page: Option<(usize, usize)>,
        hints: &RefreshHints,
    ) -> Projection<T> {
        let filtered = self.filter_items(items, hints);
        let total_rows = filtered.len();

        let paged: Vec<Arc<T>> = match page {
            Some((offset, len)) => filtered.into_iter().skip(offset).take(len).collect(),
            None => filtered,
        };

        let (rows, groups) = match self.grouping.take() {
            Some(rule) => {
                let result = self.group_rows(&rule, &paged);
                self.grouping = Some(rule);
                result
            }
            None => (paged.iter().cloned().map(Row::Item).collect(), Vec::new()),
        };

        Projection {
            rows,
            groups,
            filtered: paged,
            total_rows,
        }
    }

    fn filter_items(&mut self, items: &[Arc<T>], hints: &RefreshHints) -> Vec<Arc<T>> {
        let Some(filter) = self.filter.as_ref() else {
            self.filter_cache = None;
            return items.to_vec();
        };
        let args = self.filter_args.as_ref();
        let previous = self
            .filter_cache
            .take()
            .filter(|cache| cache.len() == items.len());

        let passed: Vec<bool> = match previous {
            Some(cache) if hints.is_filter_unchanged => cache,
            Some(cache) if hints.is_filter_narrowing => items
                .iter()
                .zip(cache)
                .map(|(item, before)| before && filter(&**item, args))
                .collect(),
            Some(cache) if hints.is_filter_expanding => items
                .iter()
                .zip(cache)
                .map(|(item, before)| before || filter(&**item, args))
                .collect(),
            _ => items.iter().map(|item| filter(&**item, args)).collect(),
        };

        let kept = items
            .iter()
            .zip(&passed)
            .filter(|(_, keep)| **keep)
            .map(|(item, _)| Arc::clone(item))
            .collect();
        if self.cache_filter_results {
            self.filter_cache = Some(passed);
        }
        kept
    }

    fn group_rows(&mut self, rule: &GroupingRule<T>, items: &[Arc<T>]) -> (Vec<Row<T>>, Vec<Arc<GroupHeader>>) {
        // Partition, keeping first-seen order of keys.
        let mut slots: HashMap<Value, usize> = HashMap::new();
        let mut partitions: Vec<(Value, Vec<Arc<T>>)> = Vec::new();
        for item in items {
            let key = rule.key(item);
            match slots.get(&key) {
                Some(&slot) => partitions[slot].1.push(Arc::clone(item)),
                None => {
                    slots.insert(key.clone(), partitions.len());
                    partitions.push((key, vec![Arc::clone(item)]));
                }
            }
        }

        let mut groups: Vec<(GroupHeader, Vec<Arc<T>>)> = partitions
            .into_iter()
            .map(|(value, members)| {
                let collapsed = self.is_collapsed(&value);
                let header = GroupHeader {
                    value,
                    title: String::new(),
                    count: members.len(),
                    collapsed,
                    start_row: 0,
                    end_row: 0,
                    totals: None,
                };
                (header, members)
            })
            .collect();

        if !self.aggregators.is_empty() {
            for (header, members) in &mut groups {
                if header.collapsed && !self.aggregate_collapsed {
                    continue;
                }
                let mut totals = GroupTotals::new(header.value.clone());
                for aggregator in &mut self.aggregators {
                    aggregator.init();
                    for item in members.iter() {
                        aggregator.accumulate(item);
                    }
                    aggregator.store_result(&mut totals);
                }
                header.totals = Some(Arc::new(totals));
            }
        }

        for (header, _) in &mut groups {
            header.title = match &rule.formatter {
                Some(format) => format(header),
                None => header.value.to_string(),
            };
        }

        if let Some(compare) = &rule.comparator {
            groups.sort_by(|(a, _), (b, _)| compare(a, b));
        }

        let mut rows = Vec::with_capacity(items.len() + groups.len() * 2);
        let mut headers = Vec::with_capacity(groups.len());
        for (mut header, members) in groups {
            let show_members = !header.collapsed;
            let totals_row = header
                .totals
                .clone()
                .filter(|_| rule.display_totals_row && (show_members || self.aggregate_collapsed));

            header.start_row = rows.len();
            header.end_row = header.start_row
                + if show_members { members.len() } else { 0 }
                + usize::from(totals_row.is_some());

            let header = Arc::new(header);
            rows.push(Row::GroupHeader(Arc::clone(&header)));
            if show_members {
                rows.extend(members.into_iter().map(Row::Item));
            }
            if let Some(totals) = totals_row {
                rows.push(Row::GroupTotals(totals));
            }
            headers.push(header);
        }
        (rows, headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::aggregator::{Avg, Sum};
    use crate::model::Record;

    fn items(values: &[(i64, &str, i64)]) -> Vec<Arc<Record>> {
        values
            .iter()
            .map(|&(id, val, n)| Arc::new(Record::new().with("id", id).with("val", val).with("n", n)))
            .collect()
    }

    fn shape(rows: &[Row<Record>]) -> Vec<String> {
        rows.iter()
            .map(|row| match row {
                Row::Item(item) => format!("{}", item.field("id")),
                Row::GroupHeader(g) => format!("H({},{})", g.value, g.count),
                Row::GroupTotals(t) => format!("T({})", t.group_value),
            })
            .collect()
    }

    fn sample() -> Vec<Arc<Record>> {
        items(&[(0, "a", 1), (1, "a", 3), (2, "b", 5), (3, "c", 7)])
    }

    #[test]
    fn test_filter_and_page() {
        let mut projector: Projector<Record, i64> = Projector::new(false);
        projector.set_filter(Some(Arc::new(|item: &Record, min: Option<&i64>| {
            item.field("n").as_int().unwrap_or(0) >= *min.unwrap_or(&0)
        })));
        projector.set_filter_args(Some(3));

        let projection = projector.project(&sample(), Some((1, 1)), &RefreshHints::default());
        assert_eq!(projection.total_rows, 3);
        assert_eq!(shape(&projection.rows), vec!["2"]);
    }

    #[test]
    fn test_empty_filter_result() {
        let mut projector: Projector<Record, ()> = Projector::new(false);
        projector.set_filter(Some(Arc::new(|_: &Record, _: Option<&()>| false)));
        projector.set_grouping(Some(GroupingRule::by_field("val")));

        let projection = projector.project(&sample(), None, &RefreshHints::default());
        assert!(projection.rows.is_empty());
        assert!(projection.groups.is_empty());
        assert_eq!(projection.total_rows, 0);
    }

    #[test]
    fn test_grouping_first_seen_order_and_ranges() {
        let mut projector: Projector<Record, ()> = Projector::new(false);
        projector.set_grouping(Some(GroupingRule::by_field("val")));

        let projection = projector.project(&sample(), None, &RefreshHints::default());
        assert_eq!(
            shape(&projection.rows),
            vec!["H(a,2)", "0", "1", "H(b,1)", "2", "H(c,1)", "3"]
        );
        let b = &projection.groups[1];
        assert_eq!((b.start_row, b.end_row), (3, 4));
        assert_eq!(b.title, "b");
    }

    #[test]
    fn test_group_comparator_and_title() {
        let mut projector: Projector<Record, ()> = Projector::new(false);
        projector.set_grouping(Some(
            GroupingRule::by_field("val")
                .with_comparator(|a, b| b.value.cmp(&a.value))
                .with_title(|g| format!("{}: {}", g.value, g.count)),
        ));

        let projection = projector.project(&sample(), None, &RefreshHints::default());
        assert_eq!(
            shape(&projection.rows),
            vec!["H(c,1)", "3", "H(b,1)", "2", "H(a,2)", "0", "1"]
        );
        assert_eq!(projection.groups[2].title, "a: 2");
    }

    #[test]
    fn test_collapsed_groups_and_totals() {
        let mut projector: Projector<Record, ()> = Projector::new(false);
        projector.set_grouping(Some(GroupingRule::by_field("val")));
        let aggregators: Vec<Box<dyn Aggregator<Record>>> =
            vec![Box::new(Sum::new("n")), Box::new(Avg::new("n"))];
        projector.set_aggregators(aggregators, false);
        projector.set_collapsed(Value::from("a"), true);

        let projection = projector.project(&sample(), None, &RefreshHints::default());
        assert_eq!(
            shape(&projection.rows),
            vec!["H(a,2)", "H(b,1)", "2", "T(b)", "H(c,1)", "3", "T(c)"]
        );
        assert!(projection.groups[0].totals.is_none());
        assert_eq!((projection.groups[0].start_row, projection.groups[0].end_row), (0, 0));
        let totals = projection.groups[2].totals.as_ref().unwrap();
        assert_eq!(totals.get("sum", "n"), Some(7.0));

        // Aggregating collapsed groups shows their totals row too.
        let aggregators: Vec<Box<dyn Aggregator<Record>>> = vec![Box::new(Sum::new("n"))];
        projector.set_aggregators(aggregators, true);
        let projection = projector.project(&sample(), None, &RefreshHints::default());
        assert_eq!(&shape(&projection.rows)[..2], &["H(a,2)", "T(a)"]);
        assert_eq!(projection.groups[0].totals.as_ref().unwrap().get("sum", "n"), Some(4.0));
    }

    #[test]
    fn test_collapse_all_then_expand_one() {
        let mut projector: Projector<Record, ()> = Projector::new(false);
        projector.set_grouping(Some(GroupingRule::by_field("val")));
        projector.set_all_collapsed(true);
        projector.set_collapsed(Value::from("b"), false);

        let projection = projector.project(&sample(), None, &RefreshHints::default());
        assert_eq!(shape(&projection.rows), vec!["H(a,2)", "H(b,1)", "2", "H(c,1)"]);
    }

    #[test]
    fn test_narrowing_hint_reuses_cache() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut projector: Projector<Record, i64> = Projector::new(true);
        projector.set_filter(Some(Arc::new(move |item: &Record, min: Option<&i64>| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            item.field("n").as_int().unwrap_or(0) >= *min.unwrap_or(&0)
        })));
        let data = sample();

        projector.set_filter_args(Some(3));
        projector.project(&data, None, &RefreshHints::default());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 4);

        projector.set_filter_args(Some(6));
        let hints = RefreshHints {
            is_filter_narrowing: true,
            ..Default::default()
        };
        let projection = projector.project(&data, None, &hints);
        // Only the three items that passed before are re-tested.
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 7);
        assert_eq!(shape(&projection.rows), vec!["3"]);
    }
}
