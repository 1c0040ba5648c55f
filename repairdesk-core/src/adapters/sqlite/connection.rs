//! SQLite connection handling.
//!
//! # Connection Modes
//! - File-based: `sqlite:///path/to/database.db` or `sqlite://./relative.db`
//! - In-memory: `sqlite::memory:` or `:memory:`
//!
//! In-memory databases live inside a single connection, so the pool holds
//! exactly one connection and never recycles it.

use super::{ConnectionConfig, SqliteAdapter};
use crate::Result;
use crate::error::RepairDeskError;
use sqlx::SqlitePool;
use url::Url;

impl SqliteAdapter {
    /// Opens a SQLite database for reading and writing.
    ///
    /// # Errors
    /// Returns error if the connection string is invalid or the file cannot
    /// be opened. Missing files are not created.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let config = parse_sqlite_connection_config(connection_string)?;
        let pool = create_sqlite_connection(connection_string, &config).await?;

        Ok(Self {
            pool,
            config,
            connection_string: connection_string.to_string(),
        })
    }

    /// Whether the database only exists in memory.
    pub fn is_in_memory(&self) -> bool {
        is_memory_url(&self.connection_string)
    }
}

fn is_memory_url(connection_string: &str) -> bool {
    connection_string.contains(":memory:") || connection_string.contains("mode=memory")
}

/// Parses a SQLite connection string into a connection configuration.
pub fn parse_sqlite_connection_config(connection_string: &str) -> Result<ConnectionConfig> {
    validate_sqlite_connection_string(connection_string)?;

    let mut config = ConnectionConfig::new("localhost".to_string())
        .with_database(extract_database_name(connection_string));

    // A single writer; also keeps in-memory data on one connection
    config.max_connections = 1;

    Ok(config)
}

/// Validates SQLite connection string format.
pub fn validate_sqlite_connection_string(connection_string: &str) -> Result<()> {
    if connection_string == ":memory:" {
        return Ok(());
    }

    if connection_string.ends_with(".db")
        || connection_string.ends_with(".sqlite")
        || connection_string.ends_with(".sqlite3")
    {
        return Ok(());
    }

    if connection_string.starts_with("sqlite:") {
        if is_memory_url(connection_string) {
            return Ok(());
        }

        if let Ok(url) = Url::parse(connection_string) {
            if url.scheme() != "sqlite" {
                return Err(RepairDeskError::configuration(
                    "la stringa di connessione deve usare lo schema sqlite://",
                ));
            }
            return Ok(());
        }

        if connection_string.starts_with("sqlite://") {
            return Ok(());
        }
    }

    Err(RepairDeskError::configuration(
        "stringa di connessione SQLite non valida: attesi un URL sqlite://, un percorso o :memory:",
    ))
}

fn extract_database_name(connection_string: &str) -> String {
    if is_memory_url(connection_string) {
        return ":memory:".to_string();
    }

    let path = connection_string
        .strip_prefix("sqlite://")
        .or_else(|| connection_string.strip_prefix("sqlite:"))
        .unwrap_or(connection_string);
    let path = path.split('?').next().unwrap_or(path);

    match path.rsplit('/').next() {
        Some(filename) if !filename.is_empty() => filename.to_string(),
        _ => "main".to_string(),
    }
}

async fn create_sqlite_connection(
    connection_string: &str,
    config: &ConnectionConfig,
) -> Result<SqlitePool> {
    use sqlx::sqlite::SqliteConnectOptions;
    use std::str::FromStr;

    let normalized = normalize_connection_string(connection_string);

    let options = SqliteConnectOptions::from_str(&normalized)
        .map_err(|e| {
            RepairDeskError::configuration(format!("stringa di connessione SQLite non valida: {}", e))
        })?
        .foreign_keys(true);

    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(RepairDeskError::connection_failed)
}

fn normalize_connection_string(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        return "sqlite::memory:".to_string();
    }

    if connection_string.starts_with("sqlite:") {
        return connection_string.to_string();
    }

    format!("sqlite://{}", connection_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sqlite_connection_string() {
        assert!(validate_sqlite_connection_string(":memory:").is_ok());
        assert!(validate_sqlite_connection_string("sqlite::memory:").is_ok());
        assert!(validate_sqlite_connection_string("sqlite:///var/lib/officina.db").is_ok());
        assert!(validate_sqlite_connection_string("./officina.sqlite").is_ok());
        assert!(validate_sqlite_connection_string("mysql://localhost/db").is_err());
        assert!(validate_sqlite_connection_string("officina").is_err());
    }

    #[test]
    fn test_extract_database_name() {
        assert_eq!(extract_database_name(":memory:"), ":memory:");
        assert_eq!(extract_database_name("sqlite::memory:"), ":memory:");
        assert_eq!(
            extract_database_name("sqlite:///var/lib/officina.db?mode=rw"),
            "officina.db"
        );
        assert_eq!(extract_database_name("dati/officina.sqlite"), "officina.sqlite");
    }

    #[test]
    fn test_normalize_connection_string() {
        assert_eq!(normalize_connection_string(":memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_connection_string("/tmp/officina.db"),
            "sqlite:///tmp/officina.db"
        );
        assert_eq!(
            normalize_connection_string("sqlite://officina.db"),
            "sqlite://officina.db"
        );
    }

    #[test]
    fn test_parse_sqlite_connection_config() {
        let config = parse_sqlite_connection_config("sqlite:///tmp/officina.db").unwrap();
        assert_eq!(config.database.as_deref(), Some("officina.db"));
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.port, None);
    }
}
