//! Interactive console for the CentroRiparazioni database.
//!
//! # Security Guarantees
//! - Passwords are never logged; connection URLs are redacted in logs and errors
//! - Operator input is bound as statement parameters only

use anyhow::Context;
use clap::Parser;
use repairdesk::cli::Cli;
use repairdesk_core::StdinPrompter;
use repairdesk_core::logging::init_logging;
use zeroize::Zeroizing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let password = if cli.ask_password {
        let entered = rpassword::prompt_password("Password del database: ")
            .context("lettura della password fallita")?;
        Some(Zeroizing::new(entered))
    } else {
        None
    };
    let database_url = cli.connection_url(password)?;

    let mut prompter = StdinPrompter::stdin();
    let mut stdout = std::io::stdout();
    repairdesk::run(&database_url, &mut prompter, &mut stdout).await
}
