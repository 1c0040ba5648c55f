//! SQLite schema collection.
//!
//! # SQLite System Tables
//! - `sqlite_master`: names of all user tables
//! - `PRAGMA table_info()`: column details, including primary-key position

use super::SqliteAdapter;
use super::type_mapping::map_sqlite_type;
use crate::Result;
use crate::error::RepairDeskError;
use crate::models::*;
use sqlx::Row;

/// Main entry point for schema collection.
pub(crate) async fn collect_schema(adapter: &SqliteAdapter) -> Result<DatabaseSchema> {
    let start_time = std::time::Instant::now();

    let db_name = adapter
        .config
        .database
        .as_deref()
        .unwrap_or("main")
        .to_string();

    tracing::info!("Starting SQLite schema collection for database: {}", db_name);

    let database_info = collect_database_info(adapter, &db_name).await?;

    let tables = match collect_tables(adapter).await {
        Ok(tables) => tables,
        Err(e) => {
            tracing::error!("Failed to collect tables: {}", e);
            return Err(e);
        }
    };

    let mut warnings = Vec::new();
    for table in &tables {
        if table.primary_key.is_none() {
            warnings.push(format!("La tabella '{}' non ha chiave primaria", table.name));
        }
    }

    let collection_duration = start_time.elapsed();
    tracing::info!(
        "SQLite schema collection completed in {:.2}s - found {} tables",
        collection_duration.as_secs_f64(),
        tables.len()
    );

    Ok(DatabaseSchema {
        database_info,
        tables,
        collection_metadata: CollectionMetadata {
            collected_at: chrono::Utc::now(),
            collection_duration_ms: collection_duration.as_millis() as u64,
            warnings,
        },
    })
}

async fn collect_database_info(adapter: &SqliteAdapter, db_name: &str) -> Result<DatabaseInfo> {
    let version: String = sqlx::query_scalar("SELECT sqlite_version()")
        .fetch_one(&adapter.pool)
        .await
        .map_err(|e| {
            RepairDeskError::collection_failed("impossibile leggere la versione di SQLite", e)
        })?;

    Ok(DatabaseInfo {
        name: db_name.to_string(),
        version: Some(format!("SQLite {}", version)),
        database_type: DatabaseType::SQLite,
    })
}

async fn collect_tables(adapter: &SqliteAdapter) -> Result<Vec<Table>> {
    let tables_query = r#"
        SELECT name
        FROM sqlite_master
        WHERE type = 'table'
        AND name NOT LIKE 'sqlite_%'
        ORDER BY name
    "#;

    let table_rows = sqlx::query(tables_query)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| RepairDeskError::collection_failed("impossibile elencare le tabelle", e))?;

    let mut tables = Vec::with_capacity(table_rows.len());

    for row in &table_rows {
        let table_name: String = row.try_get("name").map_err(|e| {
            RepairDeskError::collection_failed("nome di tabella non leggibile", e)
        })?;

        let columns = collect_table_columns(adapter, &table_name).await?;
        let primary_key = detect_primary_key(&columns);

        tracing::debug!(
            "Collected table '{}' with {} columns",
            table_name,
            columns.len()
        );

        tables.push(Table {
            name: table_name,
            schema: None,
            columns,
            primary_key,
        });
    }

    Ok(tables)
}

async fn collect_table_columns(adapter: &SqliteAdapter, table_name: &str) -> Result<Vec<Column>> {
    let columns_query = format!("PRAGMA table_info('{}')", table_name.replace('\'', "''"));

    let column_rows = sqlx::query(&columns_query)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| {
            RepairDeskError::collection_failed(
                format!("impossibile leggere le colonne di '{}'", table_name),
                e,
            )
        })?;

    let mut columns = Vec::with_capacity(column_rows.len());

    for row in column_rows.iter() {
        let cid: i64 = row.try_get("cid").unwrap_or(0);
        let name: String = row.try_get("name").unwrap_or_default();
        let declared_type: String = row.try_get("type").unwrap_or_default();
        let notnull: i64 = row.try_get("notnull").unwrap_or(0);
        let default_value: Option<String> = row
            .try_get::<Option<String>, _>("dflt_value")
            .ok()
            .flatten();
        let pk: i64 = row.try_get("pk").unwrap_or(0);

        columns.push(Column {
            name,
            data_type: map_sqlite_type(&declared_type),
            type_name: declared_type,
            // PRIMARY KEY columns are treated as NOT NULL
            is_nullable: notnull == 0 && pk == 0,
            is_primary_key: pk > 0,
            is_auto_increment: false,
            default_value,
            ordinal_position: cid as u32 + 1,
        });
    }

    mark_rowid_alias(&mut columns);

    Ok(columns)
}

/// Flags the column that aliases the rowid.
///
/// Only a table whose primary key is a single column declared exactly
/// `INTEGER` gets rowid values assigned on insert.
fn mark_rowid_alias(columns: &mut [Column]) {
    let mut keys = columns.iter_mut().filter(|c| c.is_primary_key);
    if let (Some(key), None) = (keys.next(), keys.next())
        && key.type_name.trim().eq_ignore_ascii_case("INTEGER")
    {
        key.is_auto_increment = true;
    }
}

fn detect_primary_key(columns: &[Column]) -> Option<PrimaryKey> {
    let pk_columns: Vec<String> = columns
        .iter()
        .filter(|c| c.is_primary_key)
        .map(|c| c.name.clone())
        .collect();

    if pk_columns.is_empty() {
        None
    } else {
        Some(PrimaryKey {
            name: None,
            columns: pk_columns,
        })
    }
}
