//! Unit tests for SQLite adapter.
//!
//! These tests run against in-memory databases: type mapping, column flags
//! and the session round trip.

use crate::adapters::DatabaseAdapter;
use crate::models::{DatabaseType, UnifiedDataType};
use crate::sql::Statement;
use crate::value::Value;

use super::SqliteAdapter;
use super::type_mapping::map_sqlite_type;

// =============================================================================
// Type Mapping Tests
// =============================================================================

#[test]
fn test_map_sqlite_integer_type() {
    let result = map_sqlite_type("INTEGER");
    assert!(matches!(
        result,
        UnifiedDataType::Integer {
            bits: 32,
            signed: true
        }
    ));
}

#[test]
fn test_map_sqlite_varchar_with_length() {
    let result = map_sqlite_type("VARCHAR(50)");
    assert!(matches!(
        result,
        UnifiedDataType::String {
            max_length: Some(50)
        }
    ));
}

#[test]
fn test_map_sqlite_real_type() {
    let result = map_sqlite_type("REAL");
    assert!(matches!(
        result,
        UnifiedDataType::Float {
            precision: Some(53)
        }
    ));
}

#[test]
fn test_map_sqlite_untyped_column() {
    assert!(matches!(
        map_sqlite_type(""),
        UnifiedDataType::Binary { max_length: None }
    ));
}

// =============================================================================
// Adapter Tests
// =============================================================================

async fn memory_adapter() -> SqliteAdapter {
    SqliteAdapter::new("sqlite::memory:").await.unwrap()
}

#[tokio::test]
async fn test_sqlite_adapter_basics() {
    let adapter = memory_adapter().await;

    assert_eq!(adapter.database_type(), DatabaseType::SQLite);
    assert!(adapter.is_in_memory());
    assert!(adapter.test_connection().await.is_ok());
}

#[tokio::test]
async fn test_column_flags_from_pragma() {
    let adapter = memory_adapter().await;
    sqlx::raw_sql(
        "CREATE TABLE Riparazione (
            idRiparazione INTEGER PRIMARY KEY,
            stato VARCHAR(20) NOT NULL DEFAULT 'Aperta',
            dataIngresso DATETIME NOT NULL,
            note TEXT
        )",
    )
    .execute(&adapter.pool)
    .await
    .unwrap();

    let schema = adapter.collect_schema().await.unwrap();
    let table = schema.require_table("Riparazione").unwrap();

    let id = table.require_column("idRiparazione").unwrap();
    assert!(id.is_primary_key);
    assert!(id.is_auto_increment);
    assert!(!id.is_nullable);

    let stato = table.require_column("stato").unwrap();
    assert!(stato.has_default());
    assert!(!stato.is_nullable);

    let data = table.require_column("dataIngresso").unwrap();
    assert!(data.is_datetime());
    assert_eq!(data.type_name, "DATETIME");

    let note = table.require_column("note").unwrap();
    assert!(note.is_nullable);
    assert!(!note.has_default());
    assert_eq!(note.ordinal_position, 4);
}

#[tokio::test]
async fn test_session_commit_and_rollback() {
    let adapter = memory_adapter().await;
    sqlx::raw_sql("CREATE TABLE Tecnico (idTecnico INTEGER PRIMARY KEY, nome TEXT)")
        .execute(&adapter.pool)
        .await
        .unwrap();

    let insert = Statement::new(
        "INSERT INTO `Tecnico` (`nome`) VALUES (?)",
        vec![Value::from("Marco")],
    );
    let count = Statement::new("SELECT COUNT(*) FROM `Tecnico`", Vec::new());

    let mut session = adapter.begin().await.unwrap();
    let outcome = session.execute(&insert).await.unwrap();
    assert_eq!(outcome.rows_affected, 1);
    assert_eq!(outcome.last_insert_id, Some(1));
    session.rollback().await.unwrap();

    let mut session = adapter.begin().await.unwrap();
    assert_eq!(session.fetch_scalar_i64(&count).await.unwrap(), Some(0));
    session.execute(&insert).await.unwrap();
    session.commit().await.unwrap();

    let mut session = adapter.begin().await.unwrap();
    let rows = session
        .fetch_all(&Statement::new("SELECT * FROM `Tecnico`", Vec::new()))
        .await
        .unwrap();
    session.rollback().await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].to_string(), "{idTecnico: 1, nome: Marco}");
}

#[tokio::test]
async fn test_null_parameters_are_bound_as_null() {
    let adapter = memory_adapter().await;
    sqlx::raw_sql("CREATE TABLE Fornitore (idFornitore INTEGER PRIMARY KEY, telefono TEXT)")
        .execute(&adapter.pool)
        .await
        .unwrap();

    let mut session = adapter.begin().await.unwrap();
    session
        .execute(&Statement::new(
            "INSERT INTO `Fornitore` (`idFornitore`, `telefono`) VALUES (?, ?)",
            vec![Value::Int(5), Value::Null],
        ))
        .await
        .unwrap();

    let nulls = session
        .fetch_scalar_i64(&Statement::new(
            "SELECT COUNT(*) FROM `Fornitore` WHERE `telefono` IS NULL",
            Vec::new(),
        ))
        .await
        .unwrap();
    session.rollback().await.unwrap();

    assert_eq!(nulls, Some(1));
}
