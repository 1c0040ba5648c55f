//! Schema-driven row insertion.
//!
//! [`insert_required_fields`] inserts one row while asking the operator only
//! for the columns the database cannot fill in by itself: NOT NULL columns
//! without a default that are not generated keys and were not supplied by
//! the caller.

use crate::Result;
use crate::adapters::Session;
use crate::error::RepairDeskError;
use crate::models::{Column, Table};
use crate::prompt::Prompter;
use crate::sql;
use crate::value::{FieldValues, Value, coerce_input};

/// Whether the operator must supply `column`.
fn is_required(column: &Column) -> bool {
    if column.is_primary_key && column.is_auto_increment {
        return false;
    }
    !column.has_default() && !column.is_nullable
}

fn required_prompt(table: &Table, column: &Column) -> String {
    format!(
        "Inserisci valore per {}.{} ({}) [OBBLIGATORIO]: ",
        table.name, column.name, column.type_name
    )
}

/// Asks for `column` until the operator types something other than blanks.
fn ask_required(prompter: &mut dyn Prompter, table: &Table, column: &Column) -> Result<Value> {
    let prompt = required_prompt(table, column);
    loop {
        let raw = prompter.ask(&prompt)?;
        if !raw.trim().is_empty() {
            tracing::trace!("{}.{} <- {:?}", table.name, column.name, raw);
            return Ok(coerce_input(&raw, column));
        }
    }
}

/// Resolves the key column: the explicit name, else the table's only
/// primary-key column.
fn resolve_key<'a>(table: &'a Table, pk_name: Option<&str>) -> Result<Option<&'a Column>> {
    match pk_name {
        Some(name) => table.require_column(name).map(Some),
        None => Ok(table.single_primary_key()),
    }
}

/// Inserts one row into `table` on the active transaction.
///
/// `preset` values are used as-is and their columns are never prompted for.
/// When the key column is neither generated nor defaulted and has no preset
/// value, `MAX(key) + 1` (or 1 on an empty table) is used for it. Every other
/// required column is asked through `prompter`.
///
/// # Returns
/// The key value when one was supplied or computed, else the id assigned by
/// the database, else `None`.
///
/// # Errors
/// - [`RepairDeskError::ColumnNotFound`] if `pk_name` is not a column of `table`
/// - [`RepairDeskError::EmptyInsert`] if no column ends up with a value
/// - [`RepairDeskError::Prompt`] if operator input cannot be read
/// - [`RepairDeskError::Query`] if the database rejects a statement
pub async fn insert_required_fields(
    session: &mut dyn Session,
    table: &Table,
    preset: Option<FieldValues>,
    pk_name: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<Option<Value>> {
    let mut data = preset.unwrap_or_default();
    let key = resolve_key(table, pk_name)?;

    if let Some(key) = key
        && !data.contains(&key.name)
        && !key.is_auto_increment
        && !key.has_default()
    {
        let next = session
            .fetch_scalar_i64(&sql::next_key(table, &key.name))
            .await?
            .unwrap_or(1);
        tracing::debug!("Generated key {}.{} = {}", table.name, key.name, next);
        data.set(key.name.clone(), next);
    }

    for column in &table.columns {
        if data.contains(&column.name) || !is_required(column) {
            continue;
        }
        let value = ask_required(prompter, table, column)?;
        data.set(column.name.clone(), value);
    }

    if data.is_empty() {
        return Err(RepairDeskError::EmptyInsert {
            table: table.name.clone(),
        });
    }

    let statement = sql::insert(table, &data);
    let outcome = session.execute(&statement).await?;
    tracing::info!(
        "Inserted into {} ({} columns, {} row)",
        table.name,
        data.len(),
        outcome.rows_affected
    );

    let key_value = key.and_then(|key| data.get(&key.name)).cloned();
    Ok(key_value.or(outcome.last_insert_id.map(Value::Int)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ExecOutcome, Record};
    use crate::models::{DatabaseType, UnifiedDataType};
    use crate::prompt::ScriptedPrompter;
    use crate::sql::Statement;
    use async_trait::async_trait;

    /// Records executed statements and answers `MAX + 1` with a fixed value.
    struct RecordingSession {
        next_key: Option<i64>,
        last_insert_id: Option<i64>,
        executed: Vec<Statement>,
        fetched: Vec<Statement>,
    }

    impl RecordingSession {
        fn new(next_key: Option<i64>, last_insert_id: Option<i64>) -> Self {
            Self {
                next_key,
                last_insert_id,
                executed: Vec::new(),
                fetched: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Session for RecordingSession {
        async fn fetch_all(&mut self, statement: &Statement) -> Result<Vec<Record>> {
            self.fetched.push(statement.clone());
            let mut record = Record::new();
            record.push(
                "next",
                self.next_key
                    .map_or(serde_json::Value::Null, serde_json::Value::from),
            );
            Ok(vec![record])
        }

        async fn execute(&mut self, statement: &Statement) -> Result<ExecOutcome> {
            self.executed.push(statement.clone());
            Ok(ExecOutcome {
                rows_affected: 1,
                last_insert_id: self.last_insert_id,
            })
        }

        async fn commit(self: Box<Self>) -> Result<()> {
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<()> {
            Ok(())
        }

        fn database_type(&self) -> DatabaseType {
            DatabaseType::SQLite
        }
    }

    fn column(name: &str, type_name: &str, data_type: UnifiedDataType) -> Column {
        Column {
            name: name.to_string(),
            type_name: type_name.to_string(),
            data_type,
            is_nullable: false,
            is_primary_key: false,
            is_auto_increment: false,
            default_value: None,
            ordinal_position: 0,
        }
    }

    fn int(name: &str) -> Column {
        column(
            name,
            "INT",
            UnifiedDataType::Integer {
                bits: 32,
                signed: true,
            },
        )
    }

    fn text(name: &str) -> Column {
        column(
            name,
            "VARCHAR(45)",
            UnifiedDataType::String {
                max_length: Some(45),
            },
        )
    }

    fn dispositivo() -> Table {
        let mut id = int("idDispositivo");
        id.is_primary_key = true;
        let mut marca = text("marca");
        marca.is_nullable = true;
        let mut stato = text("stato");
        stato.default_value = Some("'Nuovo'".to_string());

        let mut columns = vec![id, int("idCliente"), text("modello"), marca, stato];
        for (i, c) in columns.iter_mut().enumerate() {
            c.ordinal_position = i as u32 + 1;
        }
        Table {
            name: "Dispositivo".to_string(),
            schema: None,
            columns,
            primary_key: None,
        }
    }

    #[tokio::test]
    async fn test_synthetic_key_and_required_prompts() -> Result<()> {
        let table = dispositivo();
        let mut session = RecordingSession::new(Some(8), None);
        let mut prompter = ScriptedPrompter::new(["", "  ", "Galaxy S21"]);

        let key = insert_required_fields(
            &mut session,
            &table,
            Some(FieldValues::new().with("idCliente", 3_i64)),
            None,
            &mut prompter,
        )
        .await?;

        assert_eq!(key, Some(Value::Int(8)));
        assert_eq!(
            session.fetched[0].sql,
            "SELECT COALESCE(MAX(`idDispositivo`), 0) + 1 FROM `Dispositivo`"
        );

        // Blank answers are asked again; preset, nullable and defaulted
        // columns are never asked.
        assert_eq!(
            prompter.prompts(),
            &[
                "Inserisci valore per Dispositivo.modello (VARCHAR(45)) [OBBLIGATORIO]: ";
                3
            ]
        );

        let insert = &session.executed[0];
        assert_eq!(
            insert.sql,
            "INSERT INTO `Dispositivo` (`idCliente`, `idDispositivo`, `modello`) VALUES (?, ?, ?)"
        );
        assert_eq!(
            insert.params,
            vec![Value::Int(3), Value::Int(8), Value::from("Galaxy S21")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_preset_key_skips_generation() -> Result<()> {
        let table = dispositivo();
        let mut session = RecordingSession::new(Some(8), Some(99));
        let mut prompter = ScriptedPrompter::new(["Pixel 7"]);

        let preset = FieldValues::new()
            .with("idDispositivo", 42_i64)
            .with("idCliente", 3_i64);
        let key = insert_required_fields(
            &mut session,
            &table,
            Some(preset),
            Some("idDispositivo"),
            &mut prompter,
        )
        .await?;

        assert_eq!(key, Some(Value::Int(42)));
        assert!(session.fetched.is_empty());
        assert!(!prompter.was_asked("idDispositivo"));
        Ok(())
    }

    #[tokio::test]
    async fn test_auto_increment_key_returns_database_id() -> Result<()> {
        let mut table = dispositivo();
        table.columns[0].is_auto_increment = true;
        let mut session = RecordingSession::new(None, Some(17));
        let mut prompter = ScriptedPrompter::new(["5", "Pixel 7"]);

        let key = insert_required_fields(&mut session, &table, None, None, &mut prompter).await?;

        assert_eq!(key, Some(Value::Int(17)));
        assert!(session.fetched.is_empty());
        assert_eq!(session.executed[0].params[0], Value::Int(5));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_key_column_fails() {
        let table = dispositivo();
        let mut session = RecordingSession::new(Some(1), None);
        let mut prompter = ScriptedPrompter::default();

        let err = insert_required_fields(&mut session, &table, None, Some("id"), &mut prompter)
            .await
            .unwrap_err();
        assert!(matches!(err, RepairDeskError::ColumnNotFound { .. }));
        assert!(session.executed.is_empty());
    }

    #[tokio::test]
    async fn test_nothing_to_insert_is_rejected() {
        let mut note = text("note");
        note.is_nullable = true;
        let table = Table {
            name: "Nota".to_string(),
            schema: None,
            columns: vec![note],
            primary_key: None,
        };
        let mut session = RecordingSession::new(None, None);
        let mut prompter = ScriptedPrompter::default();

        let err = insert_required_fields(&mut session, &table, None, None, &mut prompter)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Insert vuoto su Nota: impossibile.");
        assert!(session.executed.is_empty());
    }
}
