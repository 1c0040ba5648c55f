//! Shared helpers for the SQLite integration tests.

#![allow(dead_code)]

use repairdesk_core::adapters::sqlite::SqliteAdapter;
use repairdesk_core::sql::Statement;
use repairdesk_core::{DatabaseAdapter, DatabaseSchema, Record};

pub const SCHEMA_SQL: &str = include_str!("../../../fixtures/centro_riparazioni_sqlite.sql");
pub const SEED_SQL: &str = include_str!("../../../fixtures/seed_sqlite.sql");

/// In-memory database with the full CentroRiparazioni schema, optionally
/// seeded with the sample rows.
pub async fn fixture_adapter(seed: bool) -> SqliteAdapter {
    let adapter = SqliteAdapter::new("sqlite::memory:")
        .await
        .expect("in-memory adapter");
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(&adapter.pool)
        .await
        .expect("fixture schema");
    if seed {
        sqlx::raw_sql(SEED_SQL)
            .execute(&adapter.pool)
            .await
            .expect("fixture rows");
    }
    adapter
}

/// Reflects the schema of `adapter`.
pub async fn reflect(adapter: &SqliteAdapter) -> DatabaseSchema {
    adapter.collect_schema().await.expect("schema reflection")
}

/// Runs `sql` in its own transaction and returns the rows.
pub async fn query(adapter: &SqliteAdapter, sql: &str) -> Vec<Record> {
    let mut session = adapter.begin().await.expect("begin");
    let rows = session
        .fetch_all(&Statement::new(sql, Vec::new()))
        .await
        .expect("query");
    session.rollback().await.expect("rollback");
    rows
}

/// `SELECT COUNT(*) FROM table`.
pub async fn count(adapter: &SqliteAdapter, table: &str) -> i64 {
    let mut session = adapter.begin().await.expect("begin");
    let count = session
        .fetch_scalar_i64(&Statement::new(
            format!("SELECT COUNT(*) FROM `{}`", table),
            Vec::new(),
        ))
        .await
        .expect("count")
        .unwrap_or(0);
    session.rollback().await.expect("rollback");
    count
}
