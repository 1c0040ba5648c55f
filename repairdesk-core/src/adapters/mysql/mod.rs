//! MySQL database adapter with connection pooling and schema collection.
//!
//! # Module Structure
//! - `connection`: Connection pool management and validation
//! - `type_mapping`: MySQL to unified data type conversion
//! - `schema_collection`: Table, column and primary key collection
//! - `session`: Transactions used by reports and inserts

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
use sqlx::MySqlPool;

pub use session::MySqlSession;
pub use type_mapping::map_mysql_type;

/// MySQL database adapter with connection pooling and schema collection
pub struct MySqlAdapter {
    /// Connection pool for database operations
    pub pool: MySqlPool,
    /// Connection configuration (pool settings, timeouts, etc.)
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for MySqlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAdapter")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DatabaseAdapter for MySqlAdapter {
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
        tracing::debug!("MySQL transaction started");
        Ok(Box::new(MySqlSession::new(tx)))
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::MySQL
    }

    fn connection_config(&self) -> ConnectionConfig {
        self.config.clone()
    }
}
