//! Row list diffing.

use std::collections::HashSet;
use std::sync::Arc;

use super::group::Row;
use super::item::ItemId;

/// Computes which displayed positions changed between two row lists.
///
/// Items edited since the last refresh are tracked here, because an item that
/// keeps its position and id but has new contents still needs a re-render.
#[derive(Debug, Default)]
pub struct DiffEngine {
    updated: HashSet<ItemId>,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an item as edited since the last refresh.
    pub fn mark_updated(&mut self, id: ItemId) {
        self.updated.insert(id);
    }

    /// Forgets edits; called after each completed refresh.
    pub fn clear(&mut self) {
        self.updated.clear();
    }

    /// Returns the ascending positions of `current` whose content differs
    /// from `previous`.
    ///
    /// Positions past the end of `current` are not reported; the row count
    /// change covers them. `ignore_before` and `ignore_after` narrow the scan
    /// to the known-dirty band `ignore_before..=ignore_after`.
    pub fn diff<T, F>(
        &self,
        previous: &[Row<T>],
        current: &[Row<T>],
        id_of: F,
        ignore_before: Option<usize>,
        ignore_after: Option<usize>,
    ) -> Vec<usize>
    where
        F: Fn(&T) -> Option<ItemId>,
    {
        let start = ignore_before.unwrap_or(0);
        let end = ignore_after.map_or(current.len(), |after| current.len().min(after.saturating_add(1)));
        if start >= end {
            return Vec::new();
        }

        (start..end)
            .filter(|&i| match previous.get(i) {
                None => true,
                Some(before) => self.row_changed(before, &current[i], &id_of),
            })
            .collect()
    }

    fn row_changed<T, F>(&self, before: &Row<T>, after: &Row<T>, id_of: &F) -> bool
    where
        F: Fn(&T) -> Option<ItemId>,
    {
        match (before, after) {
            (Row::GroupTotals(_), _) | (_, Row::GroupTotals(_)) => true,
            (Row::GroupHeader(a), Row::GroupHeader(b)) => !Arc::ptr_eq(a, b) && a != b,
            (Row::Item(a), Row::Item(b)) => {
                let after_id = id_of(b);
                if !Arc::ptr_eq(a, b) && id_of(a) != after_id {
                    return true;
                }
                after_id.is_some_and(|id| self.updated.contains(&id))
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupHeader, GroupTotals, Item, Record, Value};

    fn item(id: i64) -> Row<Record> {
        Row::Item(Arc::new(Record::new().with("id", id)))
    }

    fn header(value: &str, count: usize) -> Row<Record> {
        Row::GroupHeader(Arc::new(GroupHeader {
            value: Value::from(value),
            title: value.to_string(),
            count,
            collapsed: false,
            start_row: 0,
            end_row: count,
            totals: None,
        }))
    }

    fn id_of(record: &Record) -> Option<ItemId> {
        ItemId::from_value(&record.field("id"))
    }

    #[test]
    fn test_identical_lists() {
        let rows = vec![header("a", 2), item(0), item(1)];
        let engine = DiffEngine::new();
        assert!(engine.diff(&rows, &rows.clone(), id_of, None, None).is_empty());
    }

    #[test]
    fn test_equal_items_by_id_are_unchanged() {
        let engine = DiffEngine::new();
        // Fresh allocations with the same ids.
        let before = vec![item(0), item(1)];
        let after = vec![item(0), item(1), item(2)];
        assert_eq!(engine.diff(&before, &after, id_of, None, None), vec![2]);
    }

    #[test]
    fn test_updated_item_reported() {
        let rows = vec![item(0), item(1), item(2)];
        let mut engine = DiffEngine::new();
        engine.mark_updated(ItemId::from(1));
        assert_eq!(engine.diff(&rows, &rows, id_of, None, None), vec![1]);
        engine.clear();
        assert!(engine.diff(&rows, &rows, id_of, None, None).is_empty());
    }

    #[test]
    fn test_shift_after_removal() {
        let engine = DiffEngine::new();
        let before = vec![item(0), item(1), item(2)];
        let after = vec![item(0), item(2)];
        assert_eq!(engine.diff(&before, &after, id_of, None, None), vec![1]);
    }

    #[test]
    fn test_group_rows() {
        let engine = DiffEngine::new();
        let totals = Row::GroupTotals(Arc::new(GroupTotals::new(Value::from("a"))));
        let before = vec![header("a", 1), item(0), totals.clone()];
        let after = vec![header("a", 1), item(0), totals];
        // Totals rows are always re-rendered.
        assert_eq!(engine.diff(&before, &after, id_of, None, None), vec![2]);

        let after = vec![header("a", 2), item(0), item(1)];
        assert_eq!(engine.diff(&before, &after, id_of, None, None), vec![0, 2]);
    }

    #[test]
    fn test_ignore_bounds() {
        let engine = DiffEngine::new();
        let before: Vec<Row<Record>> = Vec::new();
        let after = vec![item(0), item(1), item(2), item(3)];
        assert_eq!(engine.diff(&before, &after, id_of, Some(1), Some(2)), vec![1, 2]);
        assert!(engine.diff(&before, &after, id_of, Some(3), Some(1)).is_empty());
    }
}
