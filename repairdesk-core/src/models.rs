//! Reflected schema models.
//!
//! These structures describe the live database as it was found at startup.
//! They are produced by the adapters and consumed read-only by the field
//! collector and the report definitions.

use crate::error::RepairDeskError;
use serde::{Deserialize, Serialize};

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    /// MySQL or MariaDB
    MySQL,
    SQLite,
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseType::MySQL => write!(f, "MySQL"),
            DatabaseType::SQLite => write!(f, "SQLite"),
        }
    }
}

/// Unified data type representation across database engines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnifiedDataType {
    /// String/text types with optional length
    String { max_length: Option<u32> },
    /// Integer types with bit width
    Integer { bits: u8, signed: bool },
    /// Floating point and fixed-point types
    Float { precision: Option<u8> },
    /// Boolean type
    Boolean,
    /// Date and time types
    DateTime { with_timezone: bool },
    /// Date only
    Date,
    /// Time only
    Time { with_timezone: bool },
    /// Binary data
    Binary { max_length: Option<u32> },
    /// JSON data
    Json,
    /// Custom/database-specific types
    Custom { type_name: String },
}

/// Target type for coercing operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Parsed as `i64`
    Integer,
    /// Parsed as `f64`
    Float,
    /// Kept as typed
    Text,
}

impl UnifiedDataType {
    /// The primitive an operator-typed value is coerced to.
    pub fn primitive_kind(&self) -> PrimitiveKind {
        match self {
            UnifiedDataType::Integer { .. } => PrimitiveKind::Integer,
            UnifiedDataType::Float { .. } => PrimitiveKind::Float,
            _ => PrimitiveKind::Text,
        }
    }
}

/// Database column information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Declared type as reported by the server, e.g. `varchar(50)` or `DATETIME`
    pub type_name: String,
    pub data_type: UnifiedDataType,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub default_value: Option<String>,
    pub ordinal_position: u32,
}

impl Column {
    /// Whether the database fills this column when an insert omits it.
    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }

    /// Whether values for this column are date-time strings.
    pub fn is_datetime(&self) -> bool {
        let declared = self.type_name.to_lowercase();
        declared.contains("datetime")
            || declared.contains("timestamp")
            || matches!(self.data_type, UnifiedDataType::DateTime { .. })
    }
}

/// Database table information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub schema: Option<String>,
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
}

impl Table {
    /// Looks up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether the table has a column with this exact name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Looks up a column, failing with [`RepairDeskError::ColumnNotFound`].
    pub fn require_column(&self, name: &str) -> crate::Result<&Column> {
        self.column(name)
            .ok_or_else(|| RepairDeskError::column_not_found(&self.name, name))
    }

    /// The primary-key column when the key is made of exactly one column.
    pub fn single_primary_key(&self) -> Option<&Column> {
        let mut keys = self.columns.iter().filter(|c| c.is_primary_key);
        match (keys.next(), keys.next()) {
            (Some(key), None) => Some(key),
            _ => None,
        }
    }
}

/// Primary key constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Information about the database the schema was reflected from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub version: Option<String>,
    pub database_type: DatabaseType,
}

/// Metadata about one reflection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub collected_at: chrono::DateTime<chrono::Utc>,
    pub collection_duration_ms: u64,
    pub warnings: Vec<String>,
}

/// The reflected schema: every base table of the database, by name order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub database_info: DatabaseInfo,
    pub tables: Vec<Table>,
    pub collection_metadata: CollectionMetadata,
}

impl DatabaseSchema {
    /// Looks up a table by exact name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Whether the schema has a table with this exact name.
    pub fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    /// Looks up a table, failing with the list of tables that do exist.
    pub fn require_table(&self, name: &str) -> crate::Result<&Table> {
        self.table(name)
            .ok_or_else(|| RepairDeskError::TableNotFound {
                table: name.to_string(),
                present: self.table_names(),
            })
    }

    /// Sorted names of all reflected tables.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|t| t.name.clone()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, type_name: &str, data_type: UnifiedDataType) -> Column {
        Column {
            name: name.to_string(),
            type_name: type_name.to_string(),
            data_type,
            is_nullable: true,
            is_primary_key: false,
            is_auto_increment: false,
            default_value: None,
            ordinal_position: 1,
        }
    }

    #[test]
    fn test_primitive_kind() {
        assert_eq!(
            UnifiedDataType::Integer {
                bits: 32,
                signed: true
            }
            .primitive_kind(),
            PrimitiveKind::Integer
        );
        assert_eq!(
            UnifiedDataType::Float { precision: None }.primitive_kind(),
            PrimitiveKind::Float
        );
        assert_eq!(UnifiedDataType::Boolean.primitive_kind(), PrimitiveKind::Text);
        assert_eq!(
            UnifiedDataType::String { max_length: None }.primitive_kind(),
            PrimitiveKind::Text
        );
    }

    #[test]
    fn test_is_datetime_by_declared_name() {
        let col = column(
            "dataOra",
            "datetime",
            UnifiedDataType::DateTime {
                with_timezone: false,
            },
        );
        assert!(col.is_datetime());

        let col = column("dataOra", "TIMESTAMP", UnifiedDataType::Custom {
            type_name: "TIMESTAMP".to_string(),
        });
        assert!(col.is_datetime());

        let col = column("data", "date", UnifiedDataType::Date);
        assert!(!col.is_datetime());
    }

    #[test]
    fn test_single_primary_key() {
        let mut id = column(
            "id",
            "int",
            UnifiedDataType::Integer {
                bits: 32,
                signed: true,
            },
        );
        id.is_primary_key = true;
        let mut table = Table {
            name: "Ordine".to_string(),
            schema: None,
            columns: vec![id.clone(), column("note", "text", UnifiedDataType::String {
                max_length: None,
            })],
            primary_key: None,
        };
        assert_eq!(table.single_primary_key().map(|c| c.name.as_str()), Some("id"));

        let mut second = id;
        second.name = "riga".to_string();
        table.columns.push(second);
        assert!(table.single_primary_key().is_none());
    }

    #[test]
    fn test_require_table_lists_present_tables() {
        let schema = DatabaseSchema {
            database_info: DatabaseInfo {
                name: "test".to_string(),
                version: None,
                database_type: DatabaseType::SQLite,
            },
            tables: vec![
                Table {
                    name: "Riparazione".to_string(),
                    schema: None,
                    columns: Vec::new(),
                    primary_key: None,
                },
                Table {
                    name: "Cliente".to_string(),
                    schema: None,
                    columns: Vec::new(),
                    primary_key: None,
                },
            ],
            collection_metadata: CollectionMetadata {
                collected_at: chrono::Utc::now(),
                collection_duration_ms: 0,
                warnings: Vec::new(),
            },
        };

        assert!(schema.require_table("Cliente").is_ok());
        let err = schema.require_table("Garanzia").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tabella 'Garanzia' non trovata nel Database. Ho trovato: Cliente, Riparazione"
        );
    }
}
