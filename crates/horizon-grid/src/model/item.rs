//! Items and item identity.
//!
//! An item is any record the grid displays. The engine only needs to read
//! fields by name, so the [`Item`] trait is a single accessor. One field, the
//! *id field* (`"id"` unless configured otherwise), must hold a unique value
//! per item; it is converted to an [`ItemId`] for indexing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::Value;

/// A record that can be displayed by a data view.
///
/// # Example
///
/// ```
/// use horizon_grid::model::{Item, Value};
///
/// struct Trade {
///     id: u32,
///     symbol: String,
///     quantity: i64,
/// }
///
/// impl Item for Trade {
///     fn field(&self, name: &str) -> Value {
///         match name {
///             "id" => self.id.into(),
///             "symbol" => self.symbol.as_str().into(),
///             "quantity" => self.quantity.into(),
///             _ => Value::Null,
///         }
///     }
/// }
/// ```
pub trait Item: Send + Sync + 'static {
    /// Returns the value of the named field, or `Value::Null` if absent.
    fn field(&self, name: &str) -> Value;
}

impl Item for serde_json::Value {
    fn field(&self, name: &str) -> Value {
        self.get(name).map_or(Value::Null, Value::from)
    }
}

/// The identity of an item within a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    /// Integer id (integral floats normalize here too).
    Int(i64),
    /// String id (booleans and non-integral floats are stringified).
    Str(String),
}

impl ItemId {
    /// Converts a field value into an id. `Null` has no id.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Int(i) => Some(ItemId::Int(*i)),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() && f.abs() < 9.0e18 => {
                Some(ItemId::Int(*f as i64))
            }
            Value::String(s) => Some(ItemId::Str(s.clone())),
            other => Some(ItemId::Str(other.to_string())),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(i) => write!(f, "{i}"),
            ItemId::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        ItemId::Int(value)
    }
}

impl From<i32> for ItemId {
    fn from(value: i32) -> Self {
        ItemId::Int(value as i64)
    }
}

impl From<usize> for ItemId {
    fn from(value: usize) -> Self {
        ItemId::Int(value as i64)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        ItemId::Str(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        ItemId::Str(value)
    }
}

/// A simple field map implementing [`Item`].
///
/// # Example
///
/// ```
/// use horizon_grid::model::{Item, Record, Value};
///
/// let row = Record::new().with("id", 7).with("name", "Ada");
/// assert_eq!(row.field("name"), Value::from("Ada"));
/// assert!(row.field("missing").is_null());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Gets a field by reference.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl Item for Record {
    fn field(&self, name: &str) -> Value {
        self.fields.get(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_normalization() {
        assert_eq!(ItemId::from_value(&Value::Float(3.0)), Some(ItemId::Int(3)));
        assert_eq!(
            ItemId::from_value(&Value::Float(3.5)),
            Some(ItemId::Str("3.5".into()))
        );
        assert_eq!(
            ItemId::from_value(&Value::Bool(true)),
            Some(ItemId::Str("true".into()))
        );
        assert_eq!(ItemId::from_value(&Value::Null), None);
    }

    #[test]
    fn test_json_item() {
        let item = json!({"id": 1, "name": "x"});
        assert_eq!(item.field("id"), Value::Int(1));
        assert!(item.field("nope").is_null());
        assert!(json!(5).field("id").is_null());
    }

    #[test]
    fn test_record_deserializes_from_map() {
        let record: Record = serde_json::from_str(r#"{"id": 2, "val": "b"}"#).unwrap();
        assert_eq!(record.field("id"), Value::Int(2));
        assert_eq!(record.get("val"), Some(&Value::from("b")));
    }
}
