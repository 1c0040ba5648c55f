//! Bound parameter values and operator input coercion.

use crate::models::{Column, PrimitiveKind};
use serde::Serialize;

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    Int(i64),
    Float(f64),
    /// Text, also used for dates and times
    Text(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
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

/// Column values for one insert, kept in the order they were set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    entries: Vec<(String, Value)>,
}

impl FieldValues {
    /// Creates an empty set of values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column value, replacing a previous one in place.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((column, value)),
        }
    }

    /// Builder form of [`FieldValues::set`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// The value for a column, if set.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Whether a value (NULL included) is set for the column.
    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Number of columns with a value.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no column has a value.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(column, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Length of a `YYYY-MM-DD HH:MM` timestamp.
const MINUTE_PRECISION_LEN: usize = 16;

/// Completes `YYYY-MM-DD HH:MM` to `YYYY-MM-DD HH:MM:SS`; other input is
/// returned unchanged.
pub fn complete_timestamp(raw: &str) -> String {
    if raw.chars().count() == MINUTE_PRECISION_LEN {
        format!("{}:00", raw)
    } else {
        raw.to_string()
    }
}

/// Coerces operator input into a value for `column`.
///
/// Input is trimmed and an empty string becomes NULL. Date-time columns keep
/// the text, completing minute-precision timestamps with `:00`. Integer and
/// float columns parse the text and fall back to the raw text when it does
/// not parse, leaving the final word to the database.
pub fn coerce_input(raw: &str, column: &Column) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::Null;
    }

    if column.is_datetime() {
        return Value::Text(complete_timestamp(raw));
    }

    match column.data_type.primitive_kind() {
        PrimitiveKind::Integer => raw
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(raw.to_string())),
        PrimitiveKind::Float => raw
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::Text(raw.to_string())),
        PrimitiveKind::Text => Value::Text(raw.to_string()),
    }
}
