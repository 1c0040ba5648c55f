//! Guided insert of a whole repair intake.
//!
//! One run creates a customer (`Cliente` plus its `ClientePrivato` or
//! `ClienteBusiness` row), a device, an open repair and, on request, an
//! appointment. Everything runs on the caller's transaction; the caller
//! commits on success and rolls back on any error, so a failed intake leaves
//! no partial rows behind.

use crate::Result;
use crate::adapters::Session;
use crate::error::RepairDeskError;
use crate::form::insert_required_fields;
use crate::models::{DatabaseSchema, Table};
use crate::prompt::Prompter;
use crate::value::{FieldValues, Value, complete_timestamp};
use std::io::Write;

/// Initial state of a newly opened repair.
pub const OPEN_REPAIR_STATUS: &str = "Aperta";

/// Format of the intake timestamp stored in `dataIngresso`.
const INTAKE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The two customer subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerKind {
    /// A person, stored in `ClientePrivato`
    Privato,
    /// A company, stored in `ClienteBusiness`
    Business,
}

impl CustomerKind {
    /// Parses the `1`/`2` menu answer.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Self::Privato),
            "2" => Some(Self::Business),
            _ => None,
        }
    }

    /// Value stored in `Cliente.tipoCliente`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Privato => "Privato",
            Self::Business => "Business",
        }
    }

    /// Table holding the subtype details.
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Privato => "ClientePrivato",
            Self::Business => "ClienteBusiness",
        }
    }

    /// Optional detail columns with their prompts, asked when the column
    /// exists.
    fn detail_fields(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Privato => &[
                ("nome", "Nome: "),
                ("cognome", "Cognome: "),
                ("codiceFiscale", "Codice Fiscale (invio per saltare): "),
                ("telefono", "numero di telefono (invio per saltare): "),
            ],
            Self::Business => &[
                ("ragioneSociale", "Ragione Sociale: "),
                ("partitaIVA", "Partita IVA (invio per saltare): "),
                ("telefono", "numero di telefono (invio per saltare): "),
            ],
        }
    }

    fn headings(self) -> (&'static str, &'static str) {
        match self {
            Self::Privato => ("\n>> Inserimento Cliente Privato", "Creato Cliente Privato"),
            Self::Business => ("\n>> Inserimento ClienteBusiness", "Creato ClienteBusiness"),
        }
    }
}

/// Keys of the rows created by one guided insert. A key is `None` when the
/// database did not report it.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidedInsertOutcome {
    /// Subtype chosen by the operator
    pub customer_kind: CustomerKind,
    /// Key of the new `Cliente` row
    pub id_cliente: Option<Value>,
    /// Key of the new `Dispositivo` row
    pub id_dispositivo: Option<Value>,
    /// Key of the new `Riparazione` row
    pub id_riparazione: Option<Value>,
    /// Whether the operator asked for an appointment
    pub appointment_created: bool,
    /// Key of the new `Appuntamento` row, if one was created
    pub id_appuntamento: Option<Value>,
}

fn say(out: &mut dyn Write, line: &str) -> Result<()> {
    writeln!(out, "{}", line).map_err(|e| RepairDeskError::prompt_failed("scrittura dell'output", e))
}

fn show_id(id: Option<&Value>) -> String {
    id.map_or_else(|| "n/d".to_string(), ToString::to_string)
}

/// Foreign-key value for child rows; an unreported parent key becomes NULL
/// and the database decides whether that is acceptable.
fn parent_key(id: Option<&Value>) -> Value {
    id.cloned().unwrap_or(Value::Null)
}

/// Asks `prompt` and presets `column` with the trimmed answer unless blank.
fn ask_optional(
    prompter: &mut dyn Prompter,
    preset: &mut FieldValues,
    column: &str,
    prompt: &str,
) -> Result<()> {
    let answer = prompter.ask(prompt)?;
    let answer = answer.trim();
    if !answer.is_empty() {
        preset.set(column, answer);
    }
    Ok(())
}

async fn insert_customer(
    session: &mut dyn Session,
    cliente: &Table,
    kind: CustomerKind,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<Option<Value>> {
    let mut preset = FieldValues::new();
    if cliente.has_column("tipoCliente") {
        preset.set("tipoCliente", kind.label());
    }

    say(out, "\n>> Inserimento Cliente")?;
    let id = insert_required_fields(session, cliente, Some(preset), Some("idCliente"), prompter)
        .await?;
    say(
        out,
        &format!("Creato Cliente n. idCliente={}", show_id(id.as_ref())),
    )?;
    Ok(id)
}

async fn insert_customer_details(
    session: &mut dyn Session,
    schema: &DatabaseSchema,
    kind: CustomerKind,
    id_cliente: Option<&Value>,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    let table = schema.require_table(kind.table_name())?;
    let (heading, done) = kind.headings();
    say(out, heading)?;

    let mut preset = FieldValues::new().with("idCliente", parent_key(id_cliente));
    for (column, prompt) in kind.detail_fields() {
        if table.has_column(column) {
            ask_optional(prompter, &mut preset, column, prompt)?;
        }
    }

    insert_required_fields(session, table, Some(preset), Some("idCliente"), prompter).await?;
    say(out, done)
}

async fn insert_device(
    session: &mut dyn Session,
    dispositivo: &Table,
    id_cliente: Option<&Value>,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<Option<Value>> {
    say(out, "\n>> Inserimento Dispositivo")?;
    let mut preset = FieldValues::new().with("idCliente", parent_key(id_cliente));

    let kind = prompter.ask("Tipo dispositivo (es. Smartphone/PC) [invio per saltare]: ")?;
    let kind = kind.trim();
    if !kind.is_empty()
        && let Some(column) = ["tipoDispositivo", "tipo"]
            .into_iter()
            .find(|c| dispositivo.has_column(c))
    {
        preset.set(column, kind);
    }

    for (column, prompt) in [
        ("marca", "Marca [invio per saltare]: "),
        ("modello", "Modello [invio per saltare]: "),
        ("numeroSerie", "Seriale [invio per saltare]: "),
    ] {
        if dispositivo.has_column(column) {
            ask_optional(prompter, &mut preset, column, prompt)?;
        }
    }

    let id = insert_required_fields(
        session,
        dispositivo,
        Some(preset),
        Some("idDispositivo"),
        prompter,
    )
    .await?;
    say(
        out,
        &format!("Creato Dispositivo idDispositivo={}", show_id(id.as_ref())),
    )?;
    Ok(id)
}

async fn insert_repair(
    session: &mut dyn Session,
    riparazione: &Table,
    id_dispositivo: Option<&Value>,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<Option<Value>> {
    say(out, "\n>> Inserimento Riparazione")?;
    let mut preset = FieldValues::new().with("idDispositivo", parent_key(id_dispositivo));
    if riparazione.has_column("stato") {
        preset.set("stato", OPEN_REPAIR_STATUS);
    }
    if riparazione.has_column("dataIngresso") {
        let now = chrono::Local::now().format(INTAKE_TIMESTAMP_FORMAT).to_string();
        preset.set("dataIngresso", now);
    }

    let id = insert_required_fields(
        session,
        riparazione,
        Some(preset),
        Some("idRiparazione"),
        prompter,
    )
    .await?;
    say(
        out,
        &format!("Creata Riparazione idRiparazione={}", show_id(id.as_ref())),
    )?;
    Ok(id)
}

async fn insert_appointment(
    session: &mut dyn Session,
    appuntamento: &Table,
    id_riparazione: Option<&Value>,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<Option<Value>> {
    say(out, "\n>> Inserimento Appuntamento")?;
    let mut preset = FieldValues::new().with("idRiparazione", parent_key(id_riparazione));

    if appuntamento.has_column("dataOra") {
        let answer = prompter.ask("DataOra (YYYY-MM-DD HH:MM oppure YYYY-MM-DD HH:MM:SS): ")?;
        let answer = answer.trim();
        // Left unset when blank so a NOT NULL dataOra is asked again below.
        if !answer.is_empty() {
            preset.set("dataOra", complete_timestamp(answer));
        }
    }

    let id = insert_required_fields(
        session,
        appuntamento,
        Some(preset),
        Some("idAppuntamento"),
        prompter,
    )
    .await?;
    say(
        out,
        &format!("Creato Appuntamento idAppuntamento={}", show_id(id.as_ref())),
    )?;
    Ok(id)
}

/// Runs the guided intake on `session`, reading answers from `prompter` and
/// printing progress to `out`.
///
/// # Errors
/// - [`RepairDeskError::InvalidChoice`] when the customer kind is not `1`/`2`
/// - [`RepairDeskError::TableNotFound`] when a table of the intake is missing
/// - any error of [`insert_required_fields`]
///
/// The caller must roll back `session` on error.
pub async fn guided_insert(
    session: &mut dyn Session,
    schema: &DatabaseSchema,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<GuidedInsertOutcome> {
    say(
        out,
        "\n--- INSERT GUIDATO (popola tutti i campi obbligatori dal tuo DB) ---",
    )?;
    say(out, "\nTipo cliente:")?;
    say(out, "1) Privato")?;
    say(out, "2) Business")?;
    let choice = prompter.ask("Scelta (1/2): ")?;
    let kind = CustomerKind::from_choice(&choice)
        .ok_or_else(|| RepairDeskError::invalid_choice("Tipo cliente non valido."))?;
    tracing::info!("Guided insert started for a {} customer", kind.label());

    let cliente = schema.require_table("Cliente")?;
    let dispositivo = schema.require_table("Dispositivo")?;
    let riparazione = schema.require_table("Riparazione")?;
    let appuntamento = schema.require_table("Appuntamento")?;

    let id_cliente = insert_customer(session, cliente, kind, prompter, out).await?;
    insert_customer_details(session, schema, kind, id_cliente.as_ref(), prompter, out).await?;
    let id_dispositivo =
        insert_device(session, dispositivo, id_cliente.as_ref(), prompter, out).await?;
    let id_riparazione =
        insert_repair(session, riparazione, id_dispositivo.as_ref(), prompter, out).await?;

    let wants_appointment = prompter
        .ask("Vuoi inserire un Appuntamento? (s/n): ")?
        .trim()
        .eq_ignore_ascii_case("s");
    let id_appuntamento = if wants_appointment {
        insert_appointment(session, appuntamento, id_riparazione.as_ref(), prompter, out).await?
    } else {
        None
    };

    say(out, "INSERT completato (transazione OK).")?;
    Ok(GuidedInsertOutcome {
        customer_kind: kind,
        id_cliente,
        id_dispositivo,
        id_riparazione,
        appointment_created: wants_appointment,
        id_appuntamento,
    })
}
