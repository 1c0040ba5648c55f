//! SQLite database adapter.
//!
//! # Module Structure
//! - `connection`: Connection handling and URL validation
//! - `type_mapping`: SQLite to unified data type conversion
//! - `schema_collection`: Table and column collection via sqlite_master
//! - `session`: Transactions used by reports and inserts
//!
//! Supports both file-based and in-memory databases. The in-memory form is
//! what the integration tests run against.

pub mod connection;
pub mod schema_collection;
pub mod session;
pub mod type_mapping;

#[cfg(test)]
mod tests;

use super::{ConnectionConfig, DatabaseAdapter, Session};
use crate::Result;
use crate::error::RepairDeskError;
use crate::models::*;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub use session::SqliteSession;
pub use type_mapping::map_sqlite_type;

pub struct SqliteAdapter {
    pub pool: SqlitePool,
    pub config: ConnectionConfig,
    pub connection_string: String,
}

impl std::fmt::Debug for SqliteAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAdapter")
            .field("config", &self.config)
            .field("is_in_memory", &self.is_in_memory())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DatabaseAdapter for SqliteAdapter {
    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(RepairDeskError::connection_failed)?;

        if connectivity_result != 1 {
            return Err(RepairDeskError::configuration(
                "test di connessione fallito: risultato inatteso",
            ));
        }

        Ok(())
    }

    async fn collect_schema(&self) -> Result<DatabaseSchema> {
        schema_collection::collect_schema(self).await
    }

    async fn begin(&self) -> Result<Box<dyn Session>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(RepairDeskError::connection_failed)?;
        tracing::debug!("SQLite transaction started");
        Ok(Box::new(SqliteSession::new(tx)))
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }

    fn connection_config(&self) -> ConnectionConfig {
        self.config.clone()
    }
}
