//! Startup check of the reflected schema.

use crate::error::RepairDeskError;
use crate::models::DatabaseSchema;
use crate::Result;

/// Tables the console expects, in the order they are reported when missing.
pub const REQUIRED_TABLES: [&str; 18] = [
    "Cliente",
    "ClientePrivato",
    "ClienteBusiness",
    "Dispositivo",
    "Riparazione",
    "Appuntamento",
    "Tecnico",
    "Intervento",
    "Ricambio",
    "Preventivo",
    "DettaglioPreventivo",
    "Pagamento",
    "Fornitore",
    "Fornitura",
    "Ordine",
    "DettaglioOrdine",
    "DocumentoFiscale",
    "Garanzia",
];

/// Fails with [`RepairDeskError::MissingTables`] unless every required
/// table is present. Names are compared case-sensitively.
pub fn check_required_tables(schema: &DatabaseSchema) -> Result<()> {
    let missing: Vec<String> = REQUIRED_TABLES
        .iter()
        .filter(|name| !schema.has_table(name))
        .map(|name| (*name).to_string())
        .collect();

    if missing.is_empty() {
        tracing::debug!("All {} required tables present", REQUIRED_TABLES.len());
        return Ok(());
    }

    tracing::warn!("Missing required tables: {}", missing.join(", "));
    Err(RepairDeskError::MissingTables {
        missing,
        present: schema.table_names(),
    })
}
