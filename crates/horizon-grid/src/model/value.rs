//! Field values read from items.
//!
//! Every item exposes its fields as [`Value`]s. Values have a total order
//! (used by field-based sorting and group ordering) and hash consistently with
//! their equality, so they can key group tables and collapsed-group sets.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A scalar field value.
///
/// Integers and floats compare numerically with each other, so `Int(1)` and
/// `Float(1.0)` are the same group key.
///
/// Ordering across kinds: `Null < Bool < numbers < String`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value (missing field or explicit null).
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// String value.
    String(String),
}

impl Value {
    /// Returns `true` if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Attempts to get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to get the value as a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Interprets the value as a number.
    ///
    /// Integers and floats convert directly; strings are parsed after trimming.
    /// `Null`, booleans, empty strings and NaN yield `None`.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            Value::Null | Value::Bool(_) => return None,
        };
        (!n.is_nan()).then_some(n)
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::String(_) => 3,
        }
    }
}

/// Returns `Some(i)` when `f` is integral and exactly representable as `i64`.
fn integral(f: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    (f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f)).then_some(f as i64)
}

fn cmp_int_float(i: i64, f: f64) -> Ordering {
    match integral(f) {
        Some(j) => i.cmp(&j),
        // Non-integral or out of range: never equal to an integer.
        None => match (i as f64).total_cmp(&f) {
            Ordering::Equal => Ordering::Less,
            other => other,
        },
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => match (integral(*a), integral(*b)) {
                (Some(i), Some(j)) => i.cmp(&j),
                _ => a.total_cmp(b),
            },
            (Value::Int(a), Value::Float(b)) => cmp_int_float(*a, *b),
            (Value::Float(a), Value::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => match integral(*f) {
                Some(i) => {
                    2u8.hash(state);
                    i.hash(state);
                }
                None => {
                    3u8.hash(state);
                    f.to_bits().hash(state);
                }
            },
            Value::String(s) => {
                4u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<&serde_json::Value> for Value {
    /// Scalars map directly; arrays and objects become their JSON text.
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_numeric_equality_across_kinds() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::Float(1.5));
        assert!(Value::Int(1) < Value::Float(1.5));
        assert!(Value::Float(2.5) > Value::Int(2));

        let mut set = HashSet::new();
        set.insert(Value::Int(7));
        assert!(set.contains(&Value::Float(7.0)));
    }

    #[test]
    fn test_cross_kind_order() {
        let mut values = vec![
            Value::from("b"),
            Value::Int(3),
            Value::Null,
            Value::Bool(true),
            Value::from("a"),
            Value::Float(-1.0),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Float(-1.0),
                Value::Int(3),
                Value::from("a"),
                Value::from("b"),
            ]
        );
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Value::Int(4).as_number(), Some(4.0));
        assert_eq!(Value::from(" 2.5 ").as_number(), Some(2.5));
        assert_eq!(Value::from("").as_number(), None);
        assert_eq!(Value::Null.as_number(), None);
        assert_eq!(Value::Float(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"n": 3, "f": 0.5, "s": "x", "a": [1]});
        assert_eq!(Value::from(&json["n"]), Value::Int(3));
        assert_eq!(Value::from(&json["f"]), Value::Float(0.5));
        assert_eq!(Value::from(&json["s"]), Value::from("x"));
        assert_eq!(Value::from(&json["a"]), Value::from("[1]"));
        assert_eq!(Value::from(&json["missing"]), Value::Null);
    }
}
