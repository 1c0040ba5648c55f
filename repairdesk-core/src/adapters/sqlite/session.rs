//! SQLite transactions.

use crate::Result;
use crate::adapters::session::{ExecOutcome, Record, Session};
use crate::error::RepairDeskError;
use crate::models::DatabaseType;
use crate::sql::Statement;
use crate::value::Value;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Row, Transaction};

/// An open SQLite transaction.
pub struct SqliteSession {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteSession {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
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
impl Session for SqliteSession {
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

        // last_insert_rowid() keeps its previous value after UPDATE/DELETE
        let last_insert_id = if statement.verb().eq_ignore_ascii_case("INSERT")
            && result.rows_affected() > 0
        {
            Some(result.last_insert_rowid()).filter(|id| *id != 0)
        } else {
            None
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
        tracing::debug!("SQLite transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| RepairDeskError::query_failed("ROLLBACK", e))?;
        tracing::debug!("SQLite transaction rolled back");
        Ok(())
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }
}

fn row_to_record(row: &SqliteRow) -> Record {
    use sqlx::Column;

    let mut record = Record::new();
    for (index, column) in row.columns().iter().enumerate() {
        record.push(column.name(), extract_column_value(row, index));
    }
    record
}

/// Extract a column value as a JSON value.
///
/// SQLite is dynamically typed, so the stored value's own type decides.
fn extract_column_value(row: &SqliteRow, index: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map(JsonValue::String).unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map(JsonValue::from).unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v
            .map(|bytes| JsonValue::String(String::from_utf8_lossy(&bytes).into_owned()))
            .unwrap_or(JsonValue::Null);
    }

    JsonValue::Null
}
