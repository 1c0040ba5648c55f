//! Transaction handles shared by all adapters.
//!
//! A [`Session`] is one open database transaction. Every menu operation gets
//! its own session and finishes it with [`Session::commit`] or
//! [`Session::rollback`]; dropping a session without either rolls it back.

use crate::Result;
use crate::models::DatabaseType;
use crate::sql::Statement;
use async_trait::async_trait;

/// Outcome of a data-modifying statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    /// Rows inserted, changed or deleted
    pub rows_affected: u64,
    /// Identifier generated by an auto-increment column, when the driver
    /// reports one.
    pub last_insert_id: Option<i64>,
}

/// One result row: column names and values in select order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, serde_json::Value)>,
}

impl Record {
    /// An empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    pub fn push(&mut self, column: impl Into<String>, value: serde_json::Value) {
        self.fields.push((column.into(), value));
    }

    /// Value of the first column with this name.
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Value at a select-list position.
    pub fn get_index(&self, index: usize) -> Option<&serde_json::Value> {
        self.fields.get(index).map(|(_, value)| value)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Columns and values in select order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Renders `{col: value, ...}` with strings unquoted.
impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                serde_json::Value::String(s) => write!(f, "{}: {}", name, s)?,
                serde_json::Value::Null => write!(f, "{}: NULL", name)?,
                other => write!(f, "{}: {}", name, other)?,
            }
        }
        write!(f, "}}")
    }
}

/// An open transaction.
#[async_trait]
pub trait Session: Send {
    /// Runs a query and returns every row.
    async fn fetch_all(&mut self, statement: &Statement) -> Result<Vec<Record>>;

    /// Runs a data-modifying statement.
    async fn execute(&mut self, statement: &Statement) -> Result<ExecOutcome>;

    /// Commits the transaction.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rolls the transaction back.
    async fn rollback(self: Box<Self>) -> Result<()>;

    /// Engine this session talks to.
    fn database_type(&self) -> DatabaseType;

    /// Runs a query expected to return a single integer, such as a
    /// `COUNT(*)` or `MAX(..) + 1`.
    async fn fetch_scalar_i64(&mut self, statement: &Statement) -> Result<Option<i64>> {
        let rows = self.fetch_all(statement).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get_index(0))
            .and_then(json_as_i64))
    }
}

/// Reads an integer out of a JSON cell, accepting numeric strings since
/// MySQL returns some aggregates as DECIMAL text.
pub fn json_as_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|v| i64::try_from(v).ok()))
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_display() {
        let mut record = Record::new();
        record.push("idRiparazione", json!(7));
        record.push("stato", json!("Aperta"));
        record.push("note", serde_json::Value::Null);
        assert_eq!(
            record.to_string(),
            "{idRiparazione: 7, stato: Aperta, note: NULL}"
        );
        assert_eq!(record.get("stato"), Some(&json!("Aperta")));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_json_as_i64() {
        assert_eq!(json_as_i64(&json!(3)), Some(3));
        assert_eq!(json_as_i64(&json!("12")), Some(12));
        assert_eq!(json_as_i64(&json!(4.0)), Some(4));
        assert_eq!(json_as_i64(&json!(4.5)), None);
        assert_eq!(json_as_i64(&serde_json::Value::Null), None);
    }
}
