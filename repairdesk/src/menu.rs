//! The interactive menu loop.
//!
//! Each menu operation runs in its own transaction: it is committed when
//! the operation succeeds and rolled back when it fails, after which the
//! error is printed and the loop carries on.

use crate::output::print_records;
use repairdesk_core::error::RepairDeskError;
use repairdesk_core::sql::Statement;
use repairdesk_core::workflow::guided_insert;
use repairdesk_core::{DatabaseAdapter, DatabaseSchema, Prompter, Result, Session, queries};
use std::io::Write;

/// The option list printed before every choice.
pub const MENU: &str = "
=== CENTRO RIPARAZIONI - collegato al DB tramite reflection ===
1) Dispositivi di un cliente (Privato o Business)
2) Riparazioni con appuntamento (JOIN, ordinate per data)
3) Appuntamenti di un cliente (Privato o Business)
4) Riparazioni con almeno un appuntamento (EXISTS)
5) Update stato riparazione
6) INSERT guidato (Cliente Privato/Business + Dispositivo + Riparazione + opz. Appuntamento)
0) Esci";

/// Printed when the operator exits with `0`.
pub const FAREWELL: &str = "Ciao, alla prossima!.";
/// Printed for an unknown menu or sub-menu answer.
pub const INVALID_CHOICE: &str = "Scelta non valida.";

/// A top-level menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// `1`: devices of a customer
    DevicesOfCustomer,
    /// `2`: repairs joined with their appointments
    RepairsWithAppointment,
    /// `3`: appointments of a customer
    AppointmentsOfCustomer,
    /// `4`: repairs with at least one appointment
    RepairsWithAppointmentExists,
    /// `5`: change a repair's status
    UpdateRepairStatus,
    /// `6`: guided multi-table insert
    GuidedInsert,
    /// `0`
    Exit,
}

impl MenuChoice {
    /// Parses the operator's answer; `None` for anything unknown.
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim() {
            "1" => Some(Self::DevicesOfCustomer),
            "2" => Some(Self::RepairsWithAppointment),
            "3" => Some(Self::AppointmentsOfCustomer),
            "4" => Some(Self::RepairsWithAppointmentExists),
            "5" => Some(Self::UpdateRepairStatus),
            "6" => Some(Self::GuidedInsert),
            "0" => Some(Self::Exit),
            _ => None,
        }
    }
}

fn say(out: &mut dyn Write, line: &str) -> Result<()> {
    writeln!(out, "{}", line)
        .map_err(|e| RepairDeskError::prompt_failed("scrittura dell'output", e))
}

fn trimmed(prompter: &mut dyn Prompter, prompt: &str) -> Result<String> {
    Ok(prompter.ask(prompt)?.trim().to_string())
}

/// Runs a report and prints its rows.
async fn show(
    session: &mut dyn Session,
    statement: Result<Statement>,
    out: &mut dyn Write,
) -> Result<()> {
    let rows = session.fetch_all(&statement?).await?;
    print_records(out, &rows)
        .map_err(|e| RepairDeskError::prompt_failed("scrittura dell'output", e))
}

/// Which report a customer lookup runs.
#[derive(Debug, Clone, Copy)]
enum CustomerReport {
    Devices,
    Appointments,
}

impl CustomerReport {
    fn heading(self) -> [&'static str; 3] {
        match self {
            Self::Devices => [
                "\nTipo cliente per ricerca dispositivi:",
                "1) Privato (indicare nome+cognome)",
                "2) Business (indicare ragione sociale)",
            ],
            Self::Appointments => [
                "\nTipo cliente per ricerca appuntamenti:",
                "1) Privato (nome+cognome)",
                "2) Business (ragione sociale)",
            ],
        }
    }
}

async fn customer_report(
    report: CustomerReport,
    session: &mut dyn Session,
    schema: &DatabaseSchema,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    for line in report.heading() {
        say(out, line)?;
    }

    match trimmed(prompter, "Scelta (1/2): ")?.as_str() {
        "1" => {
            let nome = trimmed(prompter, "Nome: ")?;
            let cognome = trimmed(prompter, "Cognome: ")?;
            let statement = match report {
                CustomerReport::Devices => {
                    queries::devices_of_private_customer(schema, &nome, &cognome)
                }
                CustomerReport::Appointments => {
                    queries::appointments_of_private_customer(schema, &nome, &cognome)
                }
            };
            show(session, statement, out).await
        }
        "2" => {
            let ragione_sociale = trimmed(prompter, "Ragione Sociale: ")?;
            let statement = match report {
                CustomerReport::Devices => {
                    queries::devices_of_business_customer(schema, &ragione_sociale)
                }
                CustomerReport::Appointments => {
                    queries::appointments_of_business_customer(schema, &ragione_sociale)
                }
            };
            show(session, statement, out).await
        }
        _ => say(out, INVALID_CHOICE),
    }
}

async fn update_repair_status(
    session: &mut dyn Session,
    schema: &DatabaseSchema,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    let raw_id = trimmed(prompter, "idRiparazione: ")?;
    let id = raw_id.parse::<i64>().map_err(|_| {
        RepairDeskError::invalid_input(
            "idRiparazione",
            format!("'{}' non è un numero intero", raw_id),
        )
    })?;
    let stato = trimmed(prompter, "Nuovo stato: ")?;

    let outcome = session
        .execute(&queries::update_repair_status(schema, id, &stato)?)
        .await?;
    tracing::trace!(
        "Repair {} status update touched {} rows",
        id,
        outcome.rows_affected
    );

    if outcome.rows_affected == 1 {
        say(out, "OK")
    } else {
        say(out, "Nessuna riga aggiornata")
    }
}

async fn run_operation(
    choice: MenuChoice,
    session: &mut dyn Session,
    schema: &DatabaseSchema,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    match choice {
        MenuChoice::DevicesOfCustomer => {
            customer_report(CustomerReport::Devices, session, schema, prompter, out).await
        }
        MenuChoice::RepairsWithAppointment => {
            show(session, queries::repairs_with_appointment(schema), out).await
        }
        MenuChoice::AppointmentsOfCustomer => {
            customer_report(CustomerReport::Appointments, session, schema, prompter, out).await
        }
        MenuChoice::RepairsWithAppointmentExists => {
            show(session, queries::repairs_with_appointment_exists(schema), out).await
        }
        MenuChoice::UpdateRepairStatus => {
            update_repair_status(session, schema, prompter, out).await
        }
        MenuChoice::GuidedInsert => {
            let outcome = guided_insert(session, schema, prompter, out).await?;
            tracing::debug!("Guided insert finished: {:?}", outcome);
            Ok(())
        }
        MenuChoice::Exit => Ok(()),
    }
}

/// Runs `choice` in a fresh transaction, committing on success and rolling
/// back on failure.
async fn run_in_transaction(
    choice: MenuChoice,
    adapter: &dyn DatabaseAdapter,
    schema: &DatabaseSchema,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    let mut session = adapter.begin().await?;
    match run_operation(choice, session.as_mut(), schema, prompter, out).await {
        Ok(()) => session.commit().await,
        Err(e) => {
            if let Err(rollback_error) = session.rollback().await {
                tracing::error!("Rollback failed: {}", rollback_error);
            }
            Err(e)
        }
    }
}

/// Shows the menu until the operator exits or input ends.
///
/// Operation errors are printed as `ERRORE: <message>` and do not end the
/// loop.
///
/// # Errors
/// Returns an error only when writing to `out` fails.
pub async fn run_menu(
    adapter: &dyn DatabaseAdapter,
    schema: &DatabaseSchema,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    loop {
        say(out, MENU)?;
        out.flush()
            .map_err(|e| RepairDeskError::prompt_failed("scrittura dell'output", e))?;

        let answer = match prompter.ask("Scelta: ") {
            Ok(answer) => answer,
            Err(e) => {
                tracing::info!("Leaving menu: {}", e);
                return Ok(());
            }
        };

        let Some(choice) = MenuChoice::parse(&answer) else {
            say(out, INVALID_CHOICE)?;
            continue;
        };
        if choice == MenuChoice::Exit {
            return say(out, FAREWELL);
        }

        tracing::debug!("Menu choice: {:?}", choice);
        if let Err(e) = run_in_transaction(choice, adapter, schema, prompter, out).await {
            tracing::debug!("Operation {:?} failed: {}", choice, e);
            say(out, &format!("ERRORE: {}", e))?;
        }
    }
}
