//! MySQL connection pool management and validation.

use super::{ConnectionConfig, MySqlAdapter};
use crate::Result;
use crate::error::RepairDeskError;
use sqlx::MySqlPool;
use std::time::Duration;
use url::Url;

impl MySqlAdapter {
    /// Creates a new MySQL adapter with connection pooling.
    ///
    /// The pool connects lazily; use [`crate::adapters::DatabaseAdapter::test_connection`]
    /// to fail fast on bad credentials.
    ///
    /// # Errors
    /// Returns error if:
    /// - Connection string format is invalid
    /// - Pool configuration is invalid
    pub async fn new(connection_string: &str) -> Result<Self> {
        let config = parse_mysql_connection_config(connection_string)?;
        let pool = create_mysql_connection_pool(connection_string, &config)?;

        Ok(Self { pool, config })
    }

    /// Name of the database the URL points at.
    pub(crate) fn database_name(&self) -> Result<&str> {
        self.config.database.as_deref().ok_or_else(|| {
            RepairDeskError::configuration("l'URL MySQL deve indicare il nome del database")
        })
    }
}

/// Parses a MySQL connection string into a connection configuration.
///
/// Recognized query parameters: `connect_timeout` (seconds, 1-300) and
/// `pool_max_conns` (1-100).
pub fn parse_mysql_connection_config(connection_string: &str) -> Result<ConnectionConfig> {
    validate_mysql_connection_string(connection_string)?;

    let url = Url::parse(connection_string).map_err(|e| {
        RepairDeskError::configuration(format!("stringa di connessione MySQL non valida: {}", e))
    })?;

    let mut config = ConnectionConfig::new(url.host_str().unwrap_or("localhost").to_string())
        .with_port(url.port().unwrap_or(3306));

    let database = url.path().trim_start_matches('/');
    if !database.is_empty() {
        if database.len() > 64 {
            return Err(RepairDeskError::configuration(
                "nome del database troppo lungo: massimo 64 caratteri",
            ));
        }
        config = config.with_database(database.to_string());
    }

    let username = url.username();
    if !username.is_empty() {
        config = config.with_username(username.to_string());
    }

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "connect_timeout" => {
                if let Ok(timeout_secs) = value.parse::<u64>()
                    && timeout_secs > 0
                    && timeout_secs <= 300
                {
                    config.connect_timeout = Duration::from_secs(timeout_secs);
                }
            }
            "pool_max_conns" => {
                if let Ok(max_conns) = value.parse::<u32>()
                    && max_conns > 0
                    && max_conns <= 100
                {
                    config.max_connections = max_conns;
                }
            }
            _ => {}
        }
    }

    config.validate()?;

    Ok(config)
}

/// Validates MySQL connection string format.
///
/// # Errors
/// Returns error if the string is not a `mysql://` URL with a host
pub fn validate_mysql_connection_string(connection_string: &str) -> Result<()> {
    let url = Url::parse(connection_string).map_err(|e| {
        RepairDeskError::configuration(format!("stringa di connessione MySQL non valida: {}", e))
    })?;

    if url.scheme() != "mysql" && url.scheme() != "mariadb" {
        return Err(RepairDeskError::configuration(
            "la stringa di connessione deve usare lo schema mysql://",
        ));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(RepairDeskError::configuration(
            "la stringa di connessione deve indicare un host",
        ));
    }

    Ok(())
}

/// Creates a lazily connecting MySQL pool.
fn create_mysql_connection_pool(
    connection_string: &str,
    config: &ConnectionConfig,
) -> Result<MySqlPool> {
    // sqlx only understands the mysql scheme
    let connection_string = match connection_string.strip_prefix("mariadb://") {
        Some(rest) => format!("mysql://{}", rest),
        None => connection_string.to_string(),
    };

    sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .test_before_acquire(true)
        .connect_lazy(&connection_string)
        .map_err(|e| {
            RepairDeskError::collection_failed(
                format!(
                    "impossibile creare il pool MySQL verso {}",
                    crate::adapters::redact_database_url(&connection_string)
                ),
                e,
            )
        })
}
