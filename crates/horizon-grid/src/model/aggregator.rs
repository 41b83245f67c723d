//! Per-group aggregators.
//!
//! An aggregator is driven once per group: `init`, then `accumulate` for each
//! member item, then `store_result` into the group's totals. The same instance
//! is reused for every group, so `init` must reset all state.

use std::marker::PhantomData;

use super::group::GroupTotals;
use super::item::Item;

/// A stateful per-group accumulator.
pub trait Aggregator<T>: Send + Sync {
    /// Name under which results are stored (e.g. `"avg"`).
    fn name(&self) -> &str;

    /// Field this aggregator reads. Results are keyed by `(name, field)`.
    fn field(&self) -> &str;

    /// Resets state before a new group.
    fn init(&mut self);

    /// Folds one member item in.
    fn accumulate(&mut self, item: &T);

    /// Writes the result into `totals`. Aggregators with no meaningful result
    /// (e.g. an average over no numeric values) write nothing.
    fn store_result(&self, totals: &mut GroupTotals);
}

/// Average of the numeric values of a field.
///
/// Tracks the member count, the count of numeric values, and their sum;
/// non-numeric values are skipped.
pub struct Avg<T> {
    field: String,
    count: usize,
    non_null_count: usize,
    sum: f64,
    _item: PhantomData<fn(&T)>,
}

impl<T> Avg<T> {
    /// Averages `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            count: 0,
            non_null_count: 0,
            sum: 0.0,
            _item: PhantomData,
        }
    }

    /// Members seen since the last `init`, numeric or not.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl<T: Item> Aggregator<T> for Avg<T> {
    fn name(&self) -> &str {
        "avg"
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn init(&mut self) {
        self.count = 0;
        self.non_null_count = 0;
        self.sum = 0.0;
    }

    fn accumulate(&mut self, item: &T) {
        self.count += 1;
        if let Some(n) = item.field(&self.field).as_number() {
            self.non_null_count += 1;
            self.sum += n;
        }
    }

    fn store_result(&self, totals: &mut GroupTotals) {
        if self.non_null_count != 0 {
            totals.set(self.name(), self.field(), self.sum / self.non_null_count as f64);
        }
    }
}

/// Minimum numeric value of a field.
pub struct Min<T> {
    field: String,
    min: Option<f64>,
    _item: PhantomData<fn(&T)>,
}

impl<T> Min<T> {
    /// Takes the minimum of `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            min: None,
            _item: PhantomData,
        }
    }
}

impl<T: Item> Aggregator<T> for Min<T> {
    fn name(&self) -> &str {
        "min"
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn init(&mut self) {
        self.min = None;
    }

    fn accumulate(&mut self, item: &T) {
        if let Some(n) = item.field(&self.field).as_number() {
            self.min = Some(self.min.map_or(n, |m| m.min(n)));
        }
    }

    fn store_result(&self, totals: &mut GroupTotals) {
        if let Some(min) = self.min {
            totals.set(self.name(), self.field(), min);
        }
    }
}

/// Maximum numeric value of a field.
pub struct Max<T> {
    field: String,
    max: Option<f64>,
    _item: PhantomData<fn(&T)>,
}

impl<T> Max<T> {
    /// Takes the maximum of `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            max: None,
            _item: PhantomData,
        }
    }
}

impl<T: Item> Aggregator<T> for Max<T> {
    fn name(&self) -> &str {
        "max"
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn init(&mut self) {
        self.max = None;
    }

    fn accumulate(&mut self, item: &T) {
        if let Some(n) = item.field(&self.field).as_number() {
            self.max = Some(self.max.map_or(n, |m| m.max(n)));
        }
    }

    fn store_result(&self, totals: &mut GroupTotals) {
        if let Some(max) = self.max {
            totals.set(self.name(), self.field(), max);
        }
    }
}

/// Sum of the numeric values of a field. An empty group sums to zero.
pub struct Sum<T> {
    field: String,
    sum: f64,
    _item: PhantomData<fn(&T)>,
}

impl<T> Sum<T> {
    /// Sums `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sum: 0.0,
            _item: PhantomData,
        }
    }
}

impl<T: Item> Aggregator<T> for Sum<T> {
    fn name(&self) -> &str {
        "sum"
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn init(&mut self) {
        self.sum = 0.0;
    }

    fn accumulate(&mut self, item: &T) {
        if let Some(n) = item.field(&self.field).as_number() {
            self.sum += n;
        }
    }

    fn store_result(&self, totals: &mut GroupTotals) {
        totals.set(self.name(), self.field(), self.sum);
    }
}
