//! Scalar cell values.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Category key used for cells that hold no value.
pub const MISSING_KEY: &str = "null";

/// A single cell of a record.
///
/// Mirrors what a typed CSV reader produces: numbers, dates, free text, or
/// nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Numeric cell.
    Number(f64),
    /// Date or timestamp cell.
    Date(NaiveDateTime),
    /// Any other text.
    Text(String),
    /// Empty cell.
    #[default]
    Missing,
}

impl Value {
    /// Numeric payload, if this is a finite number.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Returns true for date cells.
    #[inline]
    pub fn is_date(&self) -> bool {
        matches!(self, Value::Date(_))
    }

    /// Returns true for empty cells.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Key under which this value is grouped by categorical splits and label
    /// tallies.
    ///
    /// Two cells land in the same group exactly when their keys are equal.
    pub fn category_key(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Missing => MISSING_KEY.to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", v),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S")),
            Value::Text(s) => f.write_str(s),
            Value::Missing => f.write_str(MISSING_KEY),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}
