//! The export/import text format.
//!
//! An export document is UTF-8 text: line 1 is the literal header marker,
//! and every following non-empty line is one entry as a sequence of
//! `'Key': 'value'` pairs:
//!
//! ```text
//! Shopping Calculator
//! 'ItemID': '1', 'Product': 'Apples', 'InitialCost': '10.19', 'VAT': 'true', 'Split': 'true', 'Cost': '6.12', 'DateAdded': '2026-08-30T09:15:00+00:00'
//! ```
//!
//! The format has no escaping; instead, product validation rejects names
//! containing the field delimiter or a line break, so every value that can
//! enter the ledger serializes unambiguously.
//!
//! Import is strict: the header must match exactly, each record is decoded
//! field by field (never by evaluating the line as code), and any malformed
//! record aborts the whole import before a single entry is inserted.
//! Persisted ids are reused, restoring identities rather than reallocating
//! them; the contribution of every restored entry is signed with the mode in
//! effect at import time.

use crate::calc;
use crate::error::{FormatError, Result};
use crate::ledger::Ledger;
use crate::model::{Amount, EntryId, LedgerEntry, Mode};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::str::FromStr;

/// The first line of every export document.
pub const HEADER: &str = "Shopping Calculator";

/// The record keys, in the order they appear on each line.
const KEYS: [&str; 7] = [
    "ItemID",
    "Product",
    "InitialCost",
    "VAT",
    "Split",
    "Cost",
    "DateAdded",
];

/// A decoded record line, staged before insertion.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct ImportRecord {
    pub(crate) id: EntryId,
    pub(crate) product: String,
    pub(crate) initial_cost: Amount,
    pub(crate) vat: bool,
    pub(crate) split: bool,
    pub(crate) final_cost: Amount,
    pub(crate) added: DateTime<Utc>,
}

/// Renders the entries as an export document.
pub fn export(entries: &[LedgerEntry]) -> String {
    let mut document = String::from(HEADER);
    document.push('\n');
    for entry in entries {
        document.push_str(&format_entry(entry));
        document.push('\n');
    }
    document
}

/// Renders one entry as a record line (without the trailing newline).
fn format_entry(entry: &LedgerEntry) -> String {
    format!(
        "'ItemID': '{}', 'Product': '{}', 'InitialCost': '{}', 'VAT': '{}', 'Split': '{}', 'Cost': '{}', 'DateAdded': '{}'",
        entry.id(),
        entry.product(),
        entry.initial_cost().plain(),
        entry.vat(),
        entry.split(),
        entry.final_cost().plain(),
        entry.added().to_rfc3339(),
    )
}

/// Imports a document into the ledger, applying `mode` to every restored
/// entry. Returns the number of entries inserted.
///
/// All-or-nothing: the document is fully decoded and checked (header, record
/// shape, final-cost purity, id uniqueness against the file and the live
/// ledger) before the first entry is inserted, so a failure never leaves the
/// ledger partially imported.
pub fn import(ledger: &mut Ledger, document: &str, mode: Mode) -> Result<usize> {
    let records = parse(document)?;
    for record in &records {
        if ledger.contains(record.id) {
            return Err(FormatError::DuplicateId {
                line: line_of(document, record),
                id: record.id,
            }
            .into());
        }
    }
    let count = records.len();
    for record in records {
        ledger.restore(record, mode);
    }
    Ok(count)
}

/// Finds the 1-based line number of `record` for error reporting.
fn line_of(document: &str, record: &ImportRecord) -> usize {
    let needle = format!("'ItemID': '{}'", record.id);
    document
        .lines()
        .position(|l| l.trim_start().starts_with(&needle))
        .map(|ix| ix + 1)
        .unwrap_or_default()
}

/// Decodes a whole document into staged records.
pub(crate) fn parse(document: &str) -> std::result::Result<Vec<ImportRecord>, FormatError> {
    if document.trim().is_empty() {
        return Err(FormatError::Empty);
    }
    let mut lines = document.lines();
    let header = lines.next().unwrap_or_default();
    if header != HEADER {
        return Err(FormatError::BadHeader {
            expected: HEADER.to_string(),
            found: header.to_string(),
        });
    }
    let mut records = Vec::new();
    let mut seen = BTreeSet::new();
    for (ix, line) in lines.enumerate() {
        // 1-based, counting the header line.
        let line_no = ix + 2;
        if line.trim().is_empty() {
            continue;
        }
        let record = parse_record(line, line_no)?;
        if !seen.insert(record.id) {
            return Err(FormatError::DuplicateId {
                line: line_no,
                id: record.id,
            });
        }
        records.push(record);
    }
    Ok(records)
}

/// Decodes one record line, verifying shape and the final-cost invariant.
fn parse_record(line: &str, line_no: usize) -> std::result::Result<ImportRecord, FormatError> {
    let bad = |reason: String| FormatError::BadRecord {
        line: line_no,
        reason,
    };

    let mut reader = FieldReader::new(line.trim());
    let mut values = Vec::with_capacity(KEYS.len());
    for (ix, key) in KEYS.iter().enumerate() {
        let last = ix + 1 == KEYS.len();
        values.push(reader.take(key, last).map_err(&bad)?.to_string());
    }

    let id = EntryId::from_str(&values[0])
        .map_err(|_| bad(format!("'{}' is not a valid ItemID", values[0])))?;
    let product = calc::validate_product(&values[1]).map_err(|e| bad(e.to_string()))?;
    let initial_cost = parse_amount(&values[2], "InitialCost").map_err(&bad)?;
    let vat = parse_bool(&values[3], "VAT").map_err(&bad)?;
    let split = parse_bool(&values[4], "Split").map_err(&bad)?;
    let final_cost = parse_amount(&values[5], "Cost").map_err(&bad)?;
    let added = DateTime::parse_from_rfc3339(&values[6])
        .map_err(|e| bad(format!("'{}' is not a valid DateAdded: {e}", values[6])))?
        .with_timezone(&Utc);

    // The stored Cost must agree with recomputation from the record's own
    // fields, otherwise the final-cost invariant would be violated on insert.
    let recomputed = calc::final_cost(initial_cost, vat, split);
    if recomputed.value() != final_cost.value() {
        return Err(bad(format!(
            "Cost '{}' does not match '{}' derived from InitialCost/VAT/Split",
            final_cost.plain(),
            recomputed.plain(),
        )));
    }

    Ok(ImportRecord {
        id,
        product,
        initial_cost: initial_cost.plain(),
        vat,
        split,
        final_cost: final_cost.plain(),
        added,
    })
}

fn parse_amount(value: &str, key: &str) -> std::result::Result<Amount, String> {
    if value.trim().is_empty() {
        return Err(format!("{key} must not be empty"));
    }
    let amount =
        Amount::from_str(value).map_err(|_| format!("'{value}' is not a valid {key}"))?;
    if amount.is_negative() {
        return Err(format!("{key} must not be negative, got '{value}'"));
    }
    Ok(amount)
}

fn parse_bool(value: &str, key: &str) -> std::result::Result<bool, String> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("'{other}' is not a valid {key} (expected true or false)")),
    }
}

/// A cursor over one record line, consuming `'Key': 'value'` pairs in order.
struct FieldReader<'a> {
    rest: &'a str,
}

impl<'a> FieldReader<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    /// Consumes the next `'key': 'value'` pair and the `, ` separator that
    /// follows it (unless `last`, in which case the line must end at the
    /// closing quote).
    fn take(&mut self, key: &str, last: bool) -> std::result::Result<&'a str, String> {
        let prefix = format!("'{key}': '");
        let after = self
            .rest
            .strip_prefix(&prefix)
            .ok_or_else(|| format!("expected field '{key}'"))?;
        if last {
            let value = after
                .strip_suffix('\'')
                .ok_or_else(|| format!("unterminated value for '{key}'"))?;
            self.rest = "";
            Ok(value)
        } else {
            let end = after
                .find("', '")
                .ok_or_else(|| format!("unterminated value for '{key}'"))?;
            // Keep the quote that opens the next key's name.
            self.rest = &after[end + 3..];
            Ok(&after[..end])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::IdPolicy;

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new(IdPolicy::Monotonic);
        ledger.add("Apples", "10.19", true, true, Mode::Add).unwrap();
        ledger.add("Milk & Eggs", "2.40", false, false, Mode::Add).unwrap();
        ledger
    }

    #[test]
    fn test_export_shape() {
        let ledger = sample_ledger();
        let document = export(ledger.entries());
        let lines: Vec<&str> = document.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("'ItemID': '1', 'Product': 'Apples', 'InitialCost': '10.19', 'VAT': 'true', 'Split': 'true', 'Cost': '6.12', 'DateAdded': '"));
        assert!(lines[2].starts_with("'ItemID': '2', 'Product': 'Milk & Eggs', "));
    }

    #[test]
    fn test_export_import_round_trip() {
        let ledger = sample_ledger();
        let document = export(ledger.entries());
        let mut restored = Ledger::new(IdPolicy::Monotonic);
        let count = import(&mut restored, &document, Mode::Add).unwrap();
        assert_eq!(count, 2);
        assert_eq!(restored.entries(), ledger.entries());
        assert_eq!(restored.total(), ledger.total());
    }

    #[test]
    fn test_quoted_products_round_trip() {
        let mut ledger = Ledger::new(IdPolicy::Monotonic);
        ledger.add("Tea' n 'Coffee", "2.00", false, false, Mode::Add).unwrap();
        ledger.add("Apples'", "1.00", false, false, Mode::Add).unwrap();
        let document = export(ledger.entries());
        let mut restored = Ledger::new(IdPolicy::Monotonic);
        import(&mut restored, &document, Mode::Add).unwrap();
        assert_eq!(restored.entries(), ledger.entries());
    }

    #[test]
    fn test_delimiter_in_product_never_reaches_a_record_line() {
        // Anything the validator lets through must round-trip, so names that
        // would collide with the field delimiter or split the record across
        // lines are rejected at the door.
        let mut ledger = Ledger::new(IdPolicy::Monotonic);
        assert!(ledger.add("Tea', 'Coffee", "2.00", false, false, Mode::Add).is_err());
        assert!(ledger.add("Tea\nCoffee", "2.00", false, false, Mode::Add).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_import_preserves_ids_and_advances_allocator() {
        let mut ledger = Ledger::new(IdPolicy::Monotonic);
        let document = format!(
            "{HEADER}\n'ItemID': '7', 'Product': 'Apples', 'InitialCost': '2.00', 'VAT': 'false', 'Split': 'false', 'Cost': '2.00', 'DateAdded': '2026-08-30T09:15:00+00:00'\n"
        );
        import(&mut ledger, &document, Mode::Add).unwrap();
        assert!(ledger.contains(EntryId::new(7)));
        let next = ledger.add("Pears", "1.00", false, false, Mode::Add).unwrap().id();
        assert_eq!(next, EntryId::new(8));
    }

    #[test]
    fn test_import_applies_current_mode() {
        let ledger = sample_ledger();
        let document = export(ledger.entries());
        let mut restored = Ledger::new(IdPolicy::Monotonic);
        import(&mut restored, &document, Mode::Subtract).unwrap();
        assert_eq!(restored.total().value(), -ledger.total().value());
    }

    #[test]
    fn test_import_bad_header_fails() {
        let mut ledger = Ledger::new(IdPolicy::Monotonic);
        let err = import(&mut ledger, "Shopping List\n", Mode::Add).unwrap_err();
        assert!(err.to_string().contains("cannot be imported"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_import_empty_document_fails() {
        let mut ledger = Ledger::new(IdPolicy::Monotonic);
        assert!(import(&mut ledger, "  \n", Mode::Add).is_err());
    }

    #[test]
    fn test_import_trailing_blank_lines_ignored() {
        let ledger = sample_ledger();
        let document = format!("{}\n\n\n", export(ledger.entries()));
        let mut restored = Ledger::new(IdPolicy::Monotonic);
        assert_eq!(import(&mut restored, &document, Mode::Add).unwrap(), 2);
    }

    #[test]
    fn test_import_malformed_record_aborts_whole_import() {
        let ledger = sample_ledger();
        let mut document = export(ledger.entries());
        document.push_str("'ItemID': 'x', 'Product': 'Bad'\n");
        let mut restored = Ledger::new(IdPolicy::Monotonic);
        let err = import(&mut restored, &document, Mode::Add).unwrap_err();
        assert!(err.to_string().contains("line 4"));
        assert!(restored.is_empty(), "no partial import");
        assert_eq!(restored.total().value(), rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn test_import_rejects_tampered_cost() {
        let document = format!(
            "{HEADER}\n'ItemID': '1', 'Product': 'Apples', 'InitialCost': '10.00', 'VAT': 'true', 'Split': 'false', 'Cost': '99.00', 'DateAdded': '2026-08-30T09:15:00+00:00'\n"
        );
        let mut ledger = Ledger::new(IdPolicy::Monotonic);
        let err = import(&mut ledger, &document, Mode::Add).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_import_rejects_duplicate_id_in_file() {
        let line = "'ItemID': '1', 'Product': 'Apples', 'InitialCost': '2.00', 'VAT': 'false', 'Split': 'false', 'Cost': '2.00', 'DateAdded': '2026-08-30T09:15:00+00:00'";
        let document = format!("{HEADER}\n{line}\n{line}\n");
        let mut ledger = Ledger::new(IdPolicy::Monotonic);
        let err = import(&mut ledger, &document, Mode::Add).unwrap_err();
        assert!(err.to_string().contains("duplicate entry id 1"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_import_rejects_id_collision_with_live_entry() {
        let mut ledger = sample_ledger();
        let document = export(ledger.entries());
        let before_len = ledger.len();
        let before_total = ledger.total();
        let err = import(&mut ledger, &document, Mode::Add).unwrap_err();
        assert!(err.to_string().contains("duplicate entry id"));
        assert_eq!(ledger.len(), before_len);
        assert_eq!(ledger.total(), before_total);
    }

    #[test]
    fn test_record_line_never_evaluated_as_code() {
        // A value that would be meaningful to a literal evaluator must decode
        // as plain text.
        let document = format!(
            "{HEADER}\n'ItemID': '1', 'Product': '{{\"__import__\": 1}}', 'InitialCost': '1.00', 'VAT': 'false', 'Split': 'false', 'Cost': '1.00', 'DateAdded': '2026-08-30T09:15:00+00:00'\n"
        );
        let mut ledger = Ledger::new(IdPolicy::Monotonic);
        import(&mut ledger, &document, Mode::Add).unwrap();
        assert_eq!(ledger.entries()[0].product(), "{\"__import__\": 1}");
    }
}
