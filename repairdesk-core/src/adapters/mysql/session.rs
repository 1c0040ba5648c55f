//! MySQL transactions.

use crate::Result;
use crate::adapters::session::{ExecOutcome, Record, Session};
use crate::error::RepairDeskError;
use crate::models::DatabaseType;
use crate::sql::Statement;
use crate::value::Value;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySql, MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Row, Transaction};

/// An open MySQL transaction.
pub struct MySqlSession {
    tx: Transaction<'static, MySql>,
}

impl MySqlSession {
    pub(crate) fn new(tx: Transaction<'static, MySql>) -> Self {
        Self { tx }
    }
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [Value],
) -> Query<'q, MySql, MySqlArguments> {
    for value in params {
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Int(v) => query.bind(*v),
            Value::Float(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

#[async_trait]
impl Session for MySqlSession {
    async fn fetch_all(&mut self, statement: &Statement) -> Result<Vec<Record>> {
        tracing::trace!(sql = %statement.sql, params = ?statement.params, "fetch");
        let rows = bind_params(sqlx::query(&statement.sql), &statement.params)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| RepairDeskError::query_failed(statement.verb(), e))?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn execute(&mut self, statement: &Statement) -> Result<ExecOutcome> {
        tracing::trace!(sql = %statement.sql, params = ?statement.params, "execute");
        let result = bind_params(sqlx::query(&statement.sql), &statement.params)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| RepairDeskError::query_failed(statement.verb(), e))?;

        let last_insert_id = match result.last_insert_id() {
            0 => None,
            id => i64::try_from(id).ok(),
        };

        Ok(ExecOutcome {
            rows_affected: result.rows_affected(),
            last_insert_id,
        })
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| RepairDeskError::query_failed("COMMIT", e))?;
        tracing::debug!("MySQL transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| RepairDeskError::query_failed("ROLLBACK", e))?;
        tracing::debug!("MySQL transaction rolled back");
        Ok(())
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::MySQL
    }
}

/// Converts a row to a [`Record`], keeping select-list order.
fn row_to_record(row: &MySqlRow) -> Record {
    use sqlx::Column;

    let mut record = Record::new();
    for (index, column) in row.columns().iter().enumerate() {
        record.push(column.name(), extract_column_value(row, index));
    }
    record
}

/// Extract a column value as a JSON value.
fn extract_column_value(row: &MySqlRow, index: usize) -> JsonValue {
    // Try different types in order of likelihood
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map(JsonValue::String).unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map(JsonValue::from).unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(index) {
        return v.map(JsonValue::from).unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(index) {
        return v
            .map(|dt| JsonValue::String(dt.format("%Y-%m-%d %H:%M:%S").to_string()))
            .unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(index) {
        return v
            .map(|d| JsonValue::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveTime>, _>(index) {
        return v
            .map(|t| JsonValue::String(t.format("%H:%M:%S").to_string()))
            .unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map(JsonValue::Bool).unwrap_or(JsonValue::Null);
    }
    // DECIMAL and other types without a checked decoder arrive as text.
    if let Ok(v) = row.try_get_unchecked::<Option<String>, _>(index) {
        return v.map(JsonValue::String).unwrap_or(JsonValue::Null);
    }

    JsonValue::Null
}
