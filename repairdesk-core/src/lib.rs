//! Core library for repairdesk, the repair-shop database console.
//!
//! This crate reflects the schema of a live `CentroRiparazioni` database and
//! builds everything the console does on top of that reflection: the fixed
//! reports, the repair status update, and the guided multi-table insert
//! driven by column metadata.
//!
//! # Security Guarantees
//! - No credentials stored or logged in any data structures
//! - Connection strings are sanitized in error messages
//! - Operator values are only bound as parameters, never spliced into SQL
//!
//! # Architecture
//! - Adapters per engine behind [`DatabaseAdapter`], each handing out
//!   transactions as [`Session`] trait objects
//! - Declarative statement builders in [`sql`], report definitions in
//!   [`queries`]
//! - The schema-driven field collector in [`form`] and the guided insert in
//!   [`workflow`], both reading operator input through a [`Prompter`]

pub mod adapters;
pub mod error;
pub mod form;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod queries;
pub mod schema;
pub mod sql;
pub mod value;
pub mod workflow;

// Re-export commonly used types
pub use adapters::{
    ConnectionConfig, DatabaseAdapter, DatabaseSettings, ExecOutcome, Record, Session,
    create_adapter,
};
pub use error::{RepairDeskError, Result};
pub use models::{Column, DatabaseInfo, DatabaseSchema, DatabaseType, Table, UnifiedDataType};
pub use prompt::{Prompter, ScriptedPrompter, StdinPrompter};
pub use value::{FieldValues, Value};
