//! SQLite to unified data type conversion.
//!
//! SQLite determines type affinity from declared type names:
//! 1. Contains "INT" -> INTEGER affinity
//! 2. Contains "CHAR", "CLOB", or "TEXT" -> TEXT affinity
//! 3. Contains "BLOB" or no type specified -> BLOB affinity
//! 4. Contains "REAL", "FLOA", or "DOUB" -> REAL affinity
//! 5. Otherwise -> NUMERIC affinity
//!
//! Date and boolean names have no affinity of their own and are recognized
//! by name before falling back to rule 5.

use crate::models::UnifiedDataType;

/// Maps a declared SQLite type to the unified data type system.
///
/// # Example
/// ```rust
/// use repairdesk_core::adapters::sqlite::map_sqlite_type;
/// use repairdesk_core::models::UnifiedDataType;
///
/// let unified = map_sqlite_type("VARCHAR(50)");
/// assert!(matches!(unified, UnifiedDataType::String { max_length: Some(50) }));
/// ```
pub fn map_sqlite_type(sqlite_type: &str) -> UnifiedDataType {
    let type_upper = sqlite_type.trim().to_uppercase();

    if type_upper.is_empty() {
        return UnifiedDataType::Binary { max_length: None };
    }

    let (base_type, length) = parse_type_with_length(&type_upper);

    if base_type.contains("INT") {
        return map_integer_type(&base_type);
    }

    if base_type.contains("CHAR") || base_type.contains("CLOB") || base_type.contains("TEXT") {
        return UnifiedDataType::String { max_length: length };
    }

    if base_type.contains("BLOB") {
        return UnifiedDataType::Binary { max_length: length };
    }

    if base_type == "FLOAT" {
        return UnifiedDataType::Float {
            precision: Some(24),
        };
    }
    if base_type.contains("REAL") || base_type.contains("FLOA") || base_type.contains("DOUB") {
        return UnifiedDataType::Float {
            precision: Some(53),
        };
    }

    match base_type.as_str() {
        "BOOLEAN" | "BOOL" => UnifiedDataType::Boolean,
        "DATE" => UnifiedDataType::Date,
        "TIME" => UnifiedDataType::Time {
            with_timezone: false,
        },
        "DATETIME" | "TIMESTAMP" => UnifiedDataType::DateTime {
            with_timezone: false,
        },
        "JSON" => UnifiedDataType::Json,
        _ if base_type.contains("NUM") || base_type.contains("DEC") => {
            UnifiedDataType::Float {
                precision: length.and_then(|l| u8::try_from(l).ok()),
            }
        }
        _ => UnifiedDataType::Custom {
            type_name: sqlite_type.trim().to_string(),
        },
    }
}

/// Maps integer type variants to appropriate bit widths.
fn map_integer_type(type_name: &str) -> UnifiedDataType {
    let bits = match type_name {
        "TINYINT" => 8,
        "SMALLINT" | "INT2" => 16,
        "MEDIUMINT" | "INT3" => 24,
        "INT" | "INTEGER" | "INT4" => 32,
        // Anything else with INT is SQLite's native 64-bit integer
        _ => 64,
    };
    UnifiedDataType::Integer { bits, signed: true }
}

/// Splits `VARCHAR(50)` into `("VARCHAR", Some(50))`; for `DECIMAL(8,2)`
/// the first number is returned.
fn parse_type_with_length(type_str: &str) -> (String, Option<u32>) {
    let Some(paren_pos) = type_str.find('(') else {
        return (type_str.to_string(), None);
    };

    let base = type_str[..paren_pos].trim().to_string();
    let digits: String = type_str[paren_pos + 1..]
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();

    (base, digits.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_with_length() {
        assert_eq!(
            parse_type_with_length("VARCHAR(50)"),
            ("VARCHAR".to_string(), Some(50))
        );
        assert_eq!(
            parse_type_with_length("DECIMAL(8,2)"),
            ("DECIMAL".to_string(), Some(8))
        );
        assert_eq!(parse_type_with_length("INTEGER"), ("INTEGER".to_string(), None));
        assert_eq!(parse_type_with_length("CHAR()"), ("CHAR".to_string(), None));
    }

    #[test]
    fn test_map_date_and_numeric_names() {
        assert!(matches!(
            map_sqlite_type("datetime"),
            UnifiedDataType::DateTime { .. }
        ));
        assert!(matches!(map_sqlite_type("DATE"), UnifiedDataType::Date));
        assert!(matches!(
            map_sqlite_type("DECIMAL(8,2)"),
            UnifiedDataType::Float { precision: Some(8) }
        ));
        assert!(matches!(map_sqlite_type("BOOLEAN"), UnifiedDataType::Boolean));
    }
}
