//! Printing of report results.

use repairdesk_core::Record;
use std::io::{self, Write};

/// Shown instead of rows when a report comes back empty.
pub const NO_RESULTS: &str = "(nessun risultato)";

/// Prints one `{column: value, ...}` line per record, or [`NO_RESULTS`].
pub fn print_records(out: &mut dyn Write, records: &[Record]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "{}", NO_RESULTS);
    }
    for record in records {
        writeln!(out, "{}", record)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_report() {
        let mut out = Vec::new();
        print_records(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(nessun risultato)\n");
    }

    #[test]
    fn test_one_line_per_record() {
        let mut first = Record::new();
        first.push("dataOra", json!("2024-01-15 10:30:00"));
        let mut second = Record::new();
        second.push("dataOra", json!(null));

        let mut out = Vec::new();
        print_records(&mut out, &[first, second]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{dataOra: 2024-01-15 10:30:00}\n{dataOra: NULL}\n"
        );
    }
}
