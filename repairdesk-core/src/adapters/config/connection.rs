//! Database connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pool and timeout settings for one database connection.
///
/// # Security
/// This struct intentionally does NOT store passwords or credentials.
///
/// # Example
/// ```rust
/// use repairdesk_core::adapters::ConnectionConfig;
///
/// let config = ConnectionConfig::new("127.0.0.1".to_string())
///     .with_port(3306)
///     .with_database("CentroRiparazioni".to_string())
///     .with_username("root".to_string());
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host address (or file path for SQLite)
    pub host: String,
    /// Optional port number
    pub port: Option<u16>,
    /// Optional database name
    pub database: Option<String>,
    /// Optional username (password handled separately)
    pub username: Option<String>,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Maximum number of connections in pool
    pub max_connections: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            database: None,
            username: None,
            connect_timeout: Duration::from_secs(10),
            // One operator, one transaction at a time.
            max_connections: 2,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConnectionConfig({}{}{})",
            self.host,
            self.port.map_or_else(String::new, |p| format!(":{}", p)),
            self.database
                .as_ref()
                .map_or_else(String::new, |db| format!("/{}", db))
        )
        // Intentionally omit username and never include credentials
    }
}

impl ConnectionConfig {
    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are invalid
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.is_empty() {
            return Err(crate::error::RepairDeskError::configuration(
                "l'host non può essere vuoto",
            ));
        }

        if let Some(port) = self.port
            && port == 0
        {
            return Err(crate::error::RepairDeskError::configuration(
                "la porta deve essere maggiore di 0",
            ));
        }

        if self.max_connections == 0 {
            return Err(crate::error::RepairDeskError::configuration(
                "max_connections deve essere maggiore di 0",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::RepairDeskError::configuration(
                "connect_timeout deve essere maggiore di 0",
            ));
        }

        Ok(())
    }

    /// Creates a new connection config with default pool settings.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    /// Builder method to set username.
    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }
}
