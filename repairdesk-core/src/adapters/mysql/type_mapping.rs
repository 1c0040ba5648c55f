//! MySQL to unified data type conversion.

use crate::models::UnifiedDataType;

/// Maps a MySQL column to the unified data type system.
///
/// # Arguments
/// * `data_type` - `INFORMATION_SCHEMA.COLUMNS.DATA_TYPE`, e.g. `int`
/// * `column_type` - `COLUMN_TYPE`, e.g. `int unsigned` or `tinyint(1)`
/// * `char_max_length` - Maximum character length for string types
/// * `numeric_precision` - Precision for numeric types
/// * `numeric_scale` - Scale for decimal types
///
/// # Example
/// ```rust
/// use repairdesk_core::adapters::mysql::map_mysql_type;
/// use repairdesk_core::models::UnifiedDataType;
///
/// let unified = map_mysql_type("varchar", "varchar(50)", Some(50), None, None);
/// assert!(matches!(unified, UnifiedDataType::String { max_length: Some(50) }));
/// ```
pub fn map_mysql_type(
    data_type: &str,
    column_type: &str,
    char_max_length: Option<u32>,
    numeric_precision: Option<u8>,
    numeric_scale: Option<u8>,
) -> UnifiedDataType {
    let base_type = data_type.trim().to_lowercase();
    let column_type = column_type.trim().to_lowercase();
    let signed = !column_type.contains("unsigned");

    match base_type.as_str() {
        "char" | "varchar" => UnifiedDataType::String {
            max_length: char_max_length,
        },
        "tinytext" => UnifiedDataType::String {
            max_length: Some(255),
        },
        "text" => UnifiedDataType::String {
            max_length: Some(65535),
        },
        "mediumtext" => UnifiedDataType::String {
            max_length: Some(16_777_215),
        },
        "longtext" => UnifiedDataType::String { max_length: None },

        // TINYINT(1) is the conventional MySQL boolean
        "tinyint" if column_type.starts_with("tinyint(1)") => UnifiedDataType::Boolean,
        "tinyint" => UnifiedDataType::Integer { bits: 8, signed },
        "smallint" => UnifiedDataType::Integer { bits: 16, signed },
        "mediumint" => UnifiedDataType::Integer { bits: 24, signed },
        "int" | "integer" => UnifiedDataType::Integer { bits: 32, signed },
        "bigint" => UnifiedDataType::Integer { bits: 64, signed },
        "year" => UnifiedDataType::Integer {
            bits: 16,
            signed: false,
        },

        "decimal" | "numeric" => match numeric_scale {
            Some(0) => UnifiedDataType::Integer {
                bits: match numeric_precision {
                    Some(p) if p <= 2 => 8,
                    Some(p) if p <= 4 => 16,
                    Some(p) if p <= 9 => 32,
                    _ => 64,
                },
                signed: true,
            },
            _ => UnifiedDataType::Float {
                precision: numeric_precision,
            },
        },
        "float" => UnifiedDataType::Float {
            precision: Some(24),
        },
        "double" | "real" => UnifiedDataType::Float {
            precision: Some(53),
        },

        "date" => UnifiedDataType::Date,
        "time" => UnifiedDataType::Time {
            with_timezone: false,
        },
        "datetime" => UnifiedDataType::DateTime {
            with_timezone: false,
        },
        "timestamp" => UnifiedDataType::DateTime {
            with_timezone: true,
        },

        "binary" | "varbinary" => UnifiedDataType::Binary {
            max_length: char_max_length,
        },
        "tinyblob" | "blob" | "mediumblob" | "longblob" => {
            UnifiedDataType::Binary { max_length: None }
        }
        "bit" if column_type == "bit(1)" => UnifiedDataType::Boolean,
        "bit" => UnifiedDataType::Binary { max_length: None },

        "json" => UnifiedDataType::Json,

        _ => UnifiedDataType::Custom {
            type_name: base_type,
        },
    }
}
