//! Row list entries, group rows, and grouping rules.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::item::Item;
use super::value::Value;

/// Extracts the grouping key from an item.
pub type ValueGetter<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Produces a group's display title. Sees the final member count.
pub type TitleFormatter = Arc<dyn Fn(&GroupHeader) -> String + Send + Sync>;

/// Orders groups relative to each other.
pub type GroupComparator = Arc<dyn Fn(&GroupHeader, &GroupHeader) -> Ordering + Send + Sync>;

/// A group header row.
///
/// `start_row` is the header's own position in the row list; `end_row` is the
/// position of the last row belonging to the group (header, last member, or
/// totals row).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupHeader {
    /// The grouping key shared by every member.
    pub value: Value,
    /// Display title.
    pub title: String,
    /// Number of member items (after filtering and paging).
    pub count: usize,
    /// Whether member rows are hidden.
    pub collapsed: bool,
    /// Position of this header in the row list.
    pub start_row: usize,
    /// Position of the group's last row in the row list.
    pub end_row: usize,
    /// Aggregation results, when aggregators ran for this group.
    pub totals: Option<Arc<GroupTotals>>,
}

/// Aggregation results for one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupTotals {
    /// Key of the owning group.
    pub group_value: Value,
    /// Aggregator name -> field name -> result.
    pub results: BTreeMap<String, BTreeMap<String, f64>>,
}

impl GroupTotals {
    /// Creates empty totals for a group.
    pub fn new(group_value: Value) -> Self {
        Self {
            group_value,
            results: BTreeMap::new(),
        }
    }

    /// Looks up one result, e.g. `get("avg", "price")`.
    pub fn get(&self, aggregator: &str, field: &str) -> Option<f64> {
        self.results.get(aggregator)?.get(field).copied()
    }

    /// Records one result.
    pub fn set(&mut self, aggregator: &str, field: &str, value: f64) {
        self.results
            .entry(aggregator.to_string())
            .or_default()
            .insert(field.to_string(), value);
    }
}

/// One entry of a data view's row list.
pub enum Row<T> {
    /// A data item.
    Item(Arc<T>),
    /// A group header.
    GroupHeader(Arc<GroupHeader>),
    /// A group totals row.
    GroupTotals(Arc<GroupTotals>),
}

impl<T> Clone for Row<T> {
    fn clone(&self) -> Self {
        match self {
            Row::Item(item) => Row::Item(Arc::clone(item)),
            Row::GroupHeader(group) => Row::GroupHeader(Arc::clone(group)),
            Row::GroupTotals(totals) => Row::GroupTotals(Arc::clone(totals)),
        }
    }
}

impl<T> fmt::Debug for Row<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Row::Item(_) => f.write_str("Item"),
            Row::GroupHeader(group) => f
                .debug_struct("GroupHeader")
                .field("value", &group.value)
                .field("count", &group.count)
                .finish(),
            Row::GroupTotals(totals) => f
                .debug_struct("GroupTotals")
                .field("group_value", &totals.group_value)
                .finish(),
        }
    }
}

impl<T> Row<T> {
    /// The item, if this is an item row.
    pub fn as_item(&self) -> Option<&Arc<T>> {
        match self {
            Row::Item(item) => Some(item),
            _ => None,
        }
    }

    /// The group header, if this is a header row.
    pub fn as_group(&self) -> Option<&Arc<GroupHeader>> {
        match self {
            Row::GroupHeader(group) => Some(group),
            _ => None,
        }
    }

    /// The totals, if this is a totals row.
    pub fn as_totals(&self) -> Option<&Arc<GroupTotals>> {
        match self {
            Row::GroupTotals(totals) => Some(totals),
            _ => None,
        }
    }

    /// Whether this row is a header or totals row rather than data.
    pub fn is_group_row(&self) -> bool {
        !matches!(self, Row::Item(_))
    }
}

/// How items are grouped: the key extractor plus optional title and ordering.
///
/// # Example
///
/// ```
/// use horizon_grid::model::{GroupingRule, Record};
///
/// let rule = GroupingRule::<Record>::by_field("region")
///     .with_title(|group| format!("{} ({} items)", group.value, group.count))
///     .with_comparator(|a, b| a.value.cmp(&b.value));
/// ```
pub struct GroupingRule<T> {
    pub(crate) getter: ValueGetter<T>,
    pub(crate) formatter: Option<TitleFormatter>,
    pub(crate) comparator: Option<GroupComparator>,
    pub(crate) display_totals_row: bool,
}

impl<T> Clone for GroupingRule<T> {
    fn clone(&self) -> Self {
        Self {
            getter: Arc::clone(&self.getter),
            formatter: self.formatter.clone(),
            comparator: self.comparator.clone(),
            display_totals_row: self.display_totals_row,
        }
    }
}

impl<T: Item> GroupingRule<T> {
    /// Groups by the result of `getter`.
    pub fn new<F>(getter: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        Self {
            getter: Arc::new(getter),
            formatter: None,
            comparator: None,
            display_totals_row: true,
        }
    }

    /// Groups by the value of a named field.
    pub fn by_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(move |item: &T| item.field(&field))
    }

    /// Sets the title formatter. Without one, the title is the key's text.
    pub fn with_title<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&GroupHeader) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Sets the group comparator. Without one, groups keep first-seen order.
    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&GroupHeader, &GroupHeader) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    /// Whether totals rows are emitted into the row list (default `true`).
    ///
    /// With `false`, totals are still computed and reachable through
    /// [`GroupHeader::totals`].
    pub fn display_totals_row(mut self, display: bool) -> Self {
        self.display_totals_row = display;
        self
    }

    pub(crate) fn key(&self, item: &T) -> Value {
        (self.getter)(item)
    }
}
