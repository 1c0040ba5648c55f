//! Logging setup for the repairdesk binary.
//!
//! Log lines go to stderr so they never interleave with menu output.

use crate::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Maps the CLI verbosity flags to a maximum log level.
///
/// The interactive menu owns stdout, so the default is WARN and each `-v`
/// steps one level down.
pub fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, 2) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Builds the log filter: `directives` (usually `RUST_LOG`) when they parse,
/// otherwise the level chosen by the flags.
pub fn log_filter(directives: Option<&str>, verbose: u8, quiet: bool) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| {
            let level = LevelFilter::from_level(level_for(verbose, quiet));
            EnvFilter::default().add_directive(level.into())
        })
}

/// Initializes structured logging based on verbosity level.
///
/// A `RUST_LOG` variable in the environment overrides the flags.
///
/// # Arguments
/// * `verbose` - Verbosity level (0=WARN, 1=INFO, 2=DEBUG, 3+=TRACE)
/// * `quiet` - If true, only show ERROR level logs
///
/// # Example
/// ```rust,no_run
/// use repairdesk_core::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref(), verbose, quiet))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| {
            crate::error::RepairDeskError::configuration(format!(
                "impossibile inizializzare il logging: {}",
                e
            ))
        })?;

    Ok(())
}
