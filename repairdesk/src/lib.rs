//! Library side of the `repairdesk` console.
//!
//! `main.rs` only parses arguments and wires stdin/stdout; everything else
//! lives here so the startup sequence and the menu can be driven from tests.

pub mod cli;
pub mod menu;
pub mod output;

use anyhow::Context;
use repairdesk_core::adapters::redact_database_url;
use repairdesk_core::schema::check_required_tables;
use repairdesk_core::{DatabaseAdapter, DatabaseSchema, Prompter, create_adapter};
use std::io::Write;
use tracing::info;

/// Connects, reflects the schema and checks the required tables.
///
/// # Errors
/// Fails when the URL is invalid, the server is unreachable, the schema
/// cannot be read or a required table is missing.
pub async fn connect(
    database_url: &str,
) -> anyhow::Result<(Box<dyn DatabaseAdapter>, DatabaseSchema)> {
    let target = redact_database_url(database_url);
    info!("Connecting to {}", target);

    let adapter = create_adapter(database_url)
        .await
        .with_context(|| format!("impossibile preparare la connessione a {}", target))?;
    adapter
        .test_connection()
        .await
        .with_context(|| format!("impossibile collegarsi a {}", target))?;
    info!("Connected to {} database", adapter.database_type());

    let schema = adapter.collect_schema().await?;
    info!(
        "Reflected {} tables in {} ms",
        schema.tables.len(),
        schema.collection_metadata.collection_duration_ms
    );
    for warning in &schema.collection_metadata.warnings {
        tracing::warn!("{}", warning);
    }

    check_required_tables(&schema)?;
    Ok((adapter, schema))
}

/// Runs the whole console: startup checks, then the menu until the operator
/// leaves.
///
/// # Errors
/// Returns startup failures; errors of single menu operations are printed
/// to `out` instead.
pub async fn run(
    database_url: &str,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let (adapter, schema) = connect(database_url).await?;
    menu::run_menu(adapter.as_ref(), &schema, prompter, out).await?;
    Ok(())
}
