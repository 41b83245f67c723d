//! Ordered, id-indexed item storage.
//!
//! `ItemStore` owns the canonical item order and the id -> position index.
//! Every mutation is validated in full before anything is changed, so a
//! failed call leaves both the items and the index untouched.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use horizon_grid_core::logging::targets;

use super::item::{Item, ItemId};
use crate::error::{DataViewError, Result};

/// The id field used when none is configured.
pub const DEFAULT_ID_FIELD: &str = "id";

/// An ordered collection of items with O(1) lookup by id.
pub struct ItemStore<T> {
    items: Vec<Arc<T>>,
    id_field: String,
    id_index: HashMap<ItemId, usize>,
}

impl<T: Item> Default for ItemStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Item> ItemStore<T> {
    /// Creates an empty store keyed by the `"id"` field.
    pub fn new() -> Self {
        Self::with_id_field(DEFAULT_ID_FIELD)
    }

    /// Creates an empty store keyed by the given field.
    pub fn with_id_field(id_field: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            id_field: id_field.into(),
            id_index: HashMap::new(),
        }
    }

    /// The name of the id field.
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in canonical order.
    pub fn items(&self) -> &[Arc<T>] {
        &self.items
    }

    /// Reads an item's id using this store's id field.
    pub fn id_of(&self, item: &T) -> Option<ItemId> {
        ItemId::from_value(&item.field(&self.id_field))
    }

    /// The item at a canonical position.
    pub fn get(&self, index: usize) -> Option<&Arc<T>> {
        self.items.get(index)
    }

    /// Position of the item with this id.
    pub fn get_index_by_id(&self, id: &ItemId) -> Option<usize> {
        self.id_index.get(id).copied()
    }

    /// The item with this id.
    pub fn get_item_by_id(&self, id: &ItemId) -> Option<&Arc<T>> {
        self.get_index_by_id(id).and_then(|idx| self.items.get(idx))
    }

    /// Replaces every item, keeping the current id field.
    pub fn set_items(&mut self, items: Vec<T>) -> Result<()> {
        let items: Vec<Arc<T>> = items.into_iter().map(Arc::new).collect();
        let id_index = self.build_index(&items)?;
        self.items = items;
        self.id_index = id_index;
        Ok(())
    }

    /// Replaces every item and switches to a different id field.
    pub fn set_items_with_id_field(&mut self, items: Vec<T>, id_field: &str) -> Result<()> {
        let previous = std::mem::replace(&mut self.id_field, id_field.to_string());
        if let Err(err) = self.set_items(items) {
            self.id_field = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Inserts an item at a position, shifting later items down.
    pub fn insert_at(&mut self, index: usize, item: T) -> Result<()> {
        self.insert_many(index, vec![item])
    }

    /// Appends an item at the end.
    pub fn append(&mut self, item: T) -> Result<()> {
        self.insert_many(self.items.len(), vec![item])
    }

    /// Inserts a batch of items starting at `index`, preserving batch order.
    pub fn insert_many(&mut self, index: usize, items: Vec<T>) -> Result<()> {
        if index > self.items.len() {
            return Err(DataViewError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        let mut seen = HashSet::with_capacity(items.len());
        for (offset, item) in items.iter().enumerate() {
            let id = self.require_id(item, index + offset)?;
            if self.id_index.contains_key(&id) || !seen.insert(id.clone()) {
                return Err(self.duplicate(id));
            }
        }

        let tail = self.items.split_off(index);
        self.items.extend(items.into_iter().map(Arc::new));
        self.items.extend(tail);
        self.reindex_from(index);
        Ok(())
    }

    /// Replaces the item with `id`. The replacement must carry the same id.
    pub fn update(&mut self, id: &ItemId, item: T) -> Result<()> {
        self.update_many(std::slice::from_ref(id), vec![item])
    }

    /// Replaces several items by id. Both slices must have the same length.
    pub fn update_many(&mut self, ids: &[ItemId], items: Vec<T>) -> Result<()> {
        if ids.len() != items.len() {
            return Err(DataViewError::LengthMismatch {
                ids: ids.len(),
                items: items.len(),
            });
        }
        let mut positions = Vec::with_capacity(ids.len());
        for (id, item) in ids.iter().zip(&items) {
            let idx = self.require_known(id)?;
            let actual = self.require_id(item, idx)?;
            if &actual != id {
                tracing::warn!(target: targets::ITEM_STORE, %id, %actual, "rejected update with mismatched id");
                return Err(DataViewError::IdMismatch {
                    expected: id.clone(),
                    actual,
                });
            }
            positions.push(idx);
        }

        for (idx, item) in positions.into_iter().zip(items) {
            self.items[idx] = Arc::new(item);
        }
        Ok(())
    }

    /// Removes the item with `id`.
    pub fn delete_by_id(&mut self, id: &ItemId) -> Result<Arc<T>> {
        let mut removed = self.delete_many(std::slice::from_ref(id))?;
        Ok(removed.remove(0))
    }

    /// Removes several items by id, returning them in argument order.
    pub fn delete_many(&mut self, ids: &[ItemId]) -> Result<Vec<Arc<T>>> {
        let mut positions = Vec::with_capacity(ids.len());
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            // A repeated id would already be gone by the time it is reached.
            if !seen.insert(id) {
                return Err(DataViewError::UnknownId(id.clone()));
            }
            positions.push(self.require_known(id)?);
        }

        let removed: Vec<Arc<T>> = positions.iter().map(|&position| self.items[position].clone()).collect();
        let doomed: HashSet<usize> = positions.iter().copied().collect();
        let mut position = 0;
        self.items.retain(|_| {
            let keep = !doomed.contains(&position);
            position += 1;
            keep
        });

        for id in ids {
            self.id_index.remove(id);
        }
        if let Some(&first) = positions.iter().min() {
            self.reindex_from(first);
        }
        Ok(removed)
    }

    /// Sorts items in place, stably.
    ///
    /// Descending order reverses before and after an ascending stable sort, so
    /// items that compare equal keep their relative order in both directions.
    pub fn sort<F>(&mut self, mut compare: F, ascending: bool)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if !ascending {
            self.items.reverse();
        }
        self.items.sort_by(|a, b| compare(&**a, &**b));
        if !ascending {
            self.items.reverse();
        }
        self.reindex_from(0);
    }

    /// Sorts by a single field using [`Value`](super::Value) ordering.
    pub fn sort_by_field(&mut self, field: &str, ascending: bool) {
        self.sort(|a, b| a.field(field).cmp(&b.field(field)), ascending);
    }

    fn require_id(&self, item: &T, position: usize) -> Result<ItemId> {
        self.id_of(item).ok_or_else(|| {
            tracing::warn!(target: targets::ITEM_STORE, position, field = %self.id_field, "item without id");
            DataViewError::MissingId {
                field: self.id_field.clone(),
                position,
            }
        })
    }

    fn require_known(&self, id: &ItemId) -> Result<usize> {
        self.get_index_by_id(id).ok_or_else(|| {
            tracing::warn!(target: targets::ITEM_STORE, %id, "unknown item id");
            DataViewError::UnknownId(id.clone())
        })
    }

    fn duplicate(&self, id: ItemId) -> DataViewError {
        tracing::warn!(target: targets::ITEM_STORE, %id, "duplicate item id");
        DataViewError::DuplicateId {
            field: self.id_field.clone(),
            id,
        }
    }

    fn build_index(&self, items: &[Arc<T>]) -> Result<HashMap<ItemId, usize>> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let id = self.require_id(item, position)?;
            if index.insert(id.clone(), position).is_some() {
                return Err(self.duplicate(id));
            }
        }
        Ok(index)
    }

    /// Rewrites index entries for every position at or after `start`.
    fn reindex_from(&mut self, start: usize) {
        for position in start..self.items.len() {
            if let Some(id) = ItemId::from_value(&self.items[position].field(&self.id_field)) {
                self.id_index.insert(id, position);
            }
        }
    }
}
