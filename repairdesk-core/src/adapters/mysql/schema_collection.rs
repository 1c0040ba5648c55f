//! MySQL schema collection.
//!
//! Reads base tables, their columns and primary keys from
//! `INFORMATION_SCHEMA`.

use super::MySqlAdapter;
use super::type_mapping::map_mysql_type;
use crate::Result;
use crate::error::RepairDeskError;
use crate::models::*;
use sqlx::Row;
use sqlx::mysql::MySqlRow;

/// Main entry point for schema collection
pub(crate) async fn collect_schema(adapter: &MySqlAdapter) -> Result<DatabaseSchema> {
    let start_time = std::time::Instant::now();
    let db_name = adapter.database_name()?.to_string();

    tracing::info!(
        "Starting MySQL schema collection for database {} on {}:{}",
        db_name,
        adapter.config.host,
        adapter.config.port.unwrap_or(3306)
    );

    let database_info = collect_database_info(adapter, &db_name).await?;

    let tables = match collect_tables(adapter, &db_name).await {
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
        "MySQL schema collection completed in {:.2}s - found {} tables",
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

async fn collect_database_info(adapter: &MySqlAdapter, db_name: &str) -> Result<DatabaseInfo> {
    let version: String = sqlx::query_scalar("SELECT VERSION()")
        .fetch_one(&adapter.pool)
        .await
        .map_err(|e| {
            RepairDeskError::collection_failed("impossibile leggere la versione del server", e)
        })?;

    Ok(DatabaseInfo {
        name: db_name.to_string(),
        version: Some(version),
        database_type: DatabaseType::MySQL,
    })
}

async fn collect_tables(adapter: &MySqlAdapter, db_name: &str) -> Result<Vec<Table>> {
    // Cast to CHAR to avoid VARBINARY type issues in MySQL 8.0+
    let tables_query = r#"
        SELECT CAST(TABLE_NAME AS CHAR) as TABLE_NAME
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = ?
        AND TABLE_TYPE = 'BASE TABLE'
        ORDER BY TABLE_NAME
    "#;

    let table_rows = sqlx::query(tables_query)
        .bind(db_name)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| RepairDeskError::collection_failed("impossibile elencare le tabelle", e))?;

    let mut tables = Vec::with_capacity(table_rows.len());

    for row in &table_rows {
        let table_name: String = row.try_get("TABLE_NAME").map_err(|e| {
            RepairDeskError::collection_failed("nome di tabella non leggibile", e)
        })?;

        let primary_key = collect_table_primary_key(adapter, db_name, &table_name).await?;
        let columns = collect_table_columns(adapter, db_name, &table_name).await?;

        tracing::debug!(
            "Collected table '{}' with {} columns",
            table_name,
            columns.len()
        );

        tables.push(Table {
            name: table_name,
            schema: Some(db_name.to_string()),
            columns,
            primary_key,
        });
    }

    Ok(tables)
}

async fn collect_table_columns(
    adapter: &MySqlAdapter,
    db_name: &str,
    table_name: &str,
) -> Result<Vec<Column>> {
    let columns_query = r#"
        SELECT
            CAST(c.COLUMN_NAME AS CHAR) as COLUMN_NAME,
            CAST(c.DATA_TYPE AS CHAR) as DATA_TYPE,
            CAST(c.COLUMN_TYPE AS CHAR) as COLUMN_TYPE,
            c.CHARACTER_MAXIMUM_LENGTH,
            c.NUMERIC_PRECISION,
            c.NUMERIC_SCALE,
            CAST(c.IS_NULLABLE AS CHAR) as IS_NULLABLE,
            CAST(c.COLUMN_DEFAULT AS CHAR) as COLUMN_DEFAULT,
            CAST(c.EXTRA AS CHAR) as EXTRA,
            CAST(c.COLUMN_KEY AS CHAR) as COLUMN_KEY
        FROM INFORMATION_SCHEMA.COLUMNS c
        WHERE c.TABLE_SCHEMA = ?
        AND c.TABLE_NAME = ?
        ORDER BY c.ORDINAL_POSITION
    "#;

    let column_rows = sqlx::query(columns_query)
        .bind(db_name)
        .bind(table_name)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| {
            RepairDeskError::collection_failed(
                format!("impossibile leggere le colonne di '{}'", table_name),
                e,
            )
        })?;

    let mut columns = Vec::with_capacity(column_rows.len());

    for (index, row) in column_rows.iter().enumerate() {
        let column_name: String = row.try_get("COLUMN_NAME").map_err(|e| {
            RepairDeskError::collection_failed("nome di colonna non leggibile", e)
        })?;
        let data_type: String = row.try_get("DATA_TYPE").unwrap_or_default();
        let column_type: String = row.try_get("COLUMN_TYPE").unwrap_or_default();
        let is_nullable: String = row.try_get("IS_NULLABLE").unwrap_or_default();
        let column_default: Option<String> = row
            .try_get::<Option<String>, _>("COLUMN_DEFAULT")
            .ok()
            .flatten();
        let extra: String = row.try_get("EXTRA").unwrap_or_default();
        let column_key: String = row.try_get("COLUMN_KEY").unwrap_or_default();

        let unified_data_type = map_mysql_type(
            &data_type,
            &column_type,
            get_unsigned(row, "CHARACTER_MAXIMUM_LENGTH").map(|l| l.min(u32::MAX as u64) as u32),
            get_unsigned(row, "NUMERIC_PRECISION").map(|p| p.min(u8::MAX as u64) as u8),
            get_unsigned(row, "NUMERIC_SCALE").map(|s| s.min(u8::MAX as u64) as u8),
        );

        columns.push(Column {
            name: column_name,
            type_name: column_type.to_uppercase(),
            data_type: unified_data_type,
            is_nullable: is_nullable.eq_ignore_ascii_case("YES"),
            is_primary_key: column_key == "PRI",
            is_auto_increment: extra.to_lowercase().contains("auto_increment"),
            default_value: column_default,
            ordinal_position: index as u32 + 1,
        });
    }

    Ok(columns)
}

/// Reads a numeric catalog column whose signedness differs across server
/// versions.
fn get_unsigned(row: &MySqlRow, column: &str) -> Option<u64> {
    if let Ok(value) = row.try_get::<Option<u64>, _>(column) {
        return value;
    }
    row.try_get::<Option<i64>, _>(column)
        .ok()
        .flatten()
        .and_then(|v| u64::try_from(v).ok())
}

async fn collect_table_primary_key(
    adapter: &MySqlAdapter,
    db_name: &str,
    table_name: &str,
) -> Result<Option<PrimaryKey>> {
    let pk_query = r#"
        SELECT
            CAST(tc.CONSTRAINT_NAME AS CHAR) as CONSTRAINT_NAME,
            CAST(kcu.COLUMN_NAME AS CHAR) as COLUMN_NAME
        FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
        JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
            ON tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
            AND tc.TABLE_SCHEMA = kcu.TABLE_SCHEMA
            AND tc.TABLE_NAME = kcu.TABLE_NAME
        WHERE tc.TABLE_SCHEMA = ?
        AND tc.TABLE_NAME = ?
        AND tc.CONSTRAINT_TYPE = 'PRIMARY KEY'
        ORDER BY kcu.ORDINAL_POSITION
    "#;

    let pk_rows = sqlx::query(pk_query)
        .bind(db_name)
        .bind(table_name)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| {
            RepairDeskError::collection_failed(
                format!("impossibile leggere la chiave primaria di '{}'", table_name),
                e,
            )
        })?;

    let Some(first) = pk_rows.first() else {
        return Ok(None);
    };

    let constraint_name: Option<String> = first.try_get("CONSTRAINT_NAME").ok();
    let columns: Vec<String> = pk_rows
        .iter()
        .filter_map(|row| row.try_get::<String, _>("COLUMN_NAME").ok())
        .filter(|name| !name.is_empty())
        .collect();

    Ok(Some(PrimaryKey {
        name: constraint_name,
        columns,
    }))
}
