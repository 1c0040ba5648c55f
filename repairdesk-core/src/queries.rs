//! Report and maintenance statements of the console.
//!
//! Each definition resolves the tables and columns it touches against the
//! reflected schema first, so a database that lacks one of them fails with
//! [`RepairDeskError::TableNotFound`](crate::RepairDeskError::TableNotFound)
//! or [`RepairDeskError::ColumnNotFound`](crate::RepairDeskError::ColumnNotFound)
//! before any SQL is sent.

use crate::Result;
use crate::models::{DatabaseSchema, Table};
use crate::sql::{ColumnRef, Condition, Delete, Select, Statement, Update};

fn col(table: &Table, column: &str) -> Result<ColumnRef> {
    ColumnRef::resolve(table, column)
}

/// Inner-joins `right` to the query on the shared `column`.
fn join_on(select: Select, left: &Table, right: &Table, column: &str) -> Result<Select> {
    Ok(select.join(right, col(left, column)?, col(right, column)?))
}

/// Devices (`idDispositivo`, `marca`, `modello`) of a business customer.
pub fn devices_of_business_customer(
    schema: &DatabaseSchema,
    ragione_sociale: &str,
) -> Result<Statement> {
    let business = schema.require_table("ClienteBusiness")?;
    let cliente = schema.require_table("Cliente")?;
    let dispositivo = schema.require_table("Dispositivo")?;

    let select = Select::from(business)
        .column(col(dispositivo, "idDispositivo")?)
        .column(col(dispositivo, "marca")?)
        .column(col(dispositivo, "modello")?);
    let select = join_on(select, business, cliente, "idCliente")?;
    let select = join_on(select, cliente, dispositivo, "idCliente")?;

    Ok(select
        .filter(Condition::Equals(
            col(business, "ragioneSociale")?,
            ragione_sociale.into(),
        ))
        .to_statement())
}

/// Devices (`idDispositivo`, `marca`, `modello`) of a private customer.
pub fn devices_of_private_customer(
    schema: &DatabaseSchema,
    nome: &str,
    cognome: &str,
) -> Result<Statement> {
    let dispositivo = schema.require_table("Dispositivo")?;
    let privato = schema.require_table("ClientePrivato")?;

    let select = Select::from(dispositivo)
        .column(col(dispositivo, "idDispositivo")?)
        .column(col(dispositivo, "marca")?)
        .column(col(dispositivo, "modello")?);
    let select = join_on(select, dispositivo, privato, "idCliente")?;

    Ok(select
        .filter(Condition::Equals(col(privato, "nome")?, nome.into()))
        .filter(Condition::Equals(col(privato, "cognome")?, cognome.into()))
        .to_statement())
}

/// Joins customer subtype → Cliente → Dispositivo → Riparazione →
/// Appuntamento and projects `dataOra` in ascending order.
fn appointment_dates_from(schema: &DatabaseSchema, subtype: &Table) -> Result<Select> {
    let cliente = schema.require_table("Cliente")?;
    let dispositivo = schema.require_table("Dispositivo")?;
    let riparazione = schema.require_table("Riparazione")?;
    let appuntamento = schema.require_table("Appuntamento")?;

    let data_ora = col(appuntamento, "dataOra")?;
    let select = Select::from(subtype).column(data_ora.clone());
    let select = join_on(select, subtype, cliente, "idCliente")?;
    let select = join_on(select, cliente, dispositivo, "idCliente")?;
    let select = join_on(select, dispositivo, riparazione, "idDispositivo")?;
    let select = join_on(select, riparazione, appuntamento, "idRiparazione")?;

    Ok(select.order_by(data_ora))
}

/// Appointment dates of a business customer, oldest first.
pub fn appointments_of_business_customer(
    schema: &DatabaseSchema,
    ragione_sociale: &str,
) -> Result<Statement> {
    let business = schema.require_table("ClienteBusiness")?;
    Ok(appointment_dates_from(schema, business)?
        .filter(Condition::Equals(
            col(business, "ragioneSociale")?,
            ragione_sociale.into(),
        ))
        .to_statement())
}

/// Appointment dates of a private customer, oldest first.
pub fn appointments_of_private_customer(
    schema: &DatabaseSchema,
    nome: &str,
    cognome: &str,
) -> Result<Statement> {
    let privato = schema.require_table("ClientePrivato")?;
    Ok(appointment_dates_from(schema, privato)?
        .filter(Condition::Equals(col(privato, "nome")?, nome.into()))
        .filter(Condition::Equals(col(privato, "cognome")?, cognome.into()))
        .to_statement())
}

/// Repairs of private customers that have an appointment, with customer and
/// device details, ordered by appointment time.
pub fn repairs_with_appointment(schema: &DatabaseSchema) -> Result<Statement> {
    let privato = schema.require_table("ClientePrivato")?;
    let dispositivo = schema.require_table("Dispositivo")?;
    let riparazione = schema.require_table("Riparazione")?;
    let appuntamento = schema.require_table("Appuntamento")?;

    let data_ora = col(appuntamento, "dataOra")?;
    let select = Select::from(privato)
        .column(col(privato, "nome")?)
        .column(col(privato, "cognome")?)
        .column(col(dispositivo, "marca")?)
        .column(col(dispositivo, "modello")?)
        .column(col(riparazione, "idRiparazione")?)
        .column(col(riparazione, "stato")?)
        .column(data_ora.clone());
    let select = join_on(select, privato, dispositivo, "idCliente")?;
    let select = join_on(select, dispositivo, riparazione, "idDispositivo")?;
    let select = join_on(select, riparazione, appuntamento, "idRiparazione")?;

    Ok(select
        .order_by(data_ora)
        .to_statement())
}

/// Every repair with at least one appointment, via a correlated `EXISTS`.
pub fn repairs_with_appointment_exists(schema: &DatabaseSchema) -> Result<Statement> {
    let riparazione = schema.require_table("Riparazione")?;
    let appuntamento = schema.require_table("Appuntamento")?;

    let subquery = Select::from(appuntamento)
        .literal(1)
        .filter(Condition::ColumnsEqual(
            col(appuntamento, "idRiparazione")?,
            col(riparazione, "idRiparazione")?,
        ));

    Ok(Select::from(riparazione)
        .all_columns(riparazione)
        .filter(Condition::Exists(Box::new(subquery)))
        .to_statement())
}

/// Sets `stato` of one repair.
pub fn update_repair_status(
    schema: &DatabaseSchema,
    id_riparazione: i64,
    stato: &str,
) -> Result<Statement> {
    let riparazione = schema.require_table("Riparazione")?;
    Ok(Update::table(riparazione)
        .set(col(riparazione, "stato")?, stato)
        .filter(Condition::Equals(
            col(riparazione, "idRiparazione")?,
            id_riparazione.into(),
        ))
        .to_statement())
}

/// Deletes a repair together with its appointments.
///
/// Returns the appointment delete first; run both, in order, in one
/// transaction.
pub fn delete_repair(
    schema: &DatabaseSchema,
    id_riparazione: i64,
) -> Result<(Statement, Statement)> {
    let riparazione = schema.require_table("Riparazione")?;
    let appuntamento = schema.require_table("Appuntamento")?;

    let appointments = Delete::from(appuntamento)
        .filter(Condition::Equals(
            col(appuntamento, "idRiparazione")?,
            id_riparazione.into(),
        ))
        .to_statement();
    let repair = Delete::from(riparazione)
        .filter(Condition::Equals(
            col(riparazione, "idRiparazione")?,
            id_riparazione.into(),
        ))
        .to_statement();

    Ok((appointments, repair))
}
