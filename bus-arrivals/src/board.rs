//! Service list processing.
//!
//! Turns the raw service records of one upstream response into sorted,
//! display-ready rows. A record that cannot be converted is dropped and
//! reported, and the rest of the batch is kept.
//!
//! # Ordering
//!
//! Rows are ordered by line label:
//!
//! 1. Labels starting with digits, ascending by that leading number, then
//!    by the remainder of the label ("2" < "12", "10" < "10e" < "10X").
//! 2. Labels without a leading digit, in upstream order.
//! 3. Records with no label, in upstream order.
//!
//! Labels with equal keys keep their upstream order.

use std::cmp::Ordering;

use tracing::warn;

use crate::arrivelah::{ConversionError, RawServiceRecord, convert_service};
use crate::domain::{
    ArrivalSlot, BusService, DisplayServiceRow, NOT_AVAILABLE, compute_clock_text,
    compute_eta_text,
};

/// A service record that could not be turned into a row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed service record #{index}: {error}")]
pub struct MalformedRecord {
    /// Position of the record in the upstream list.
    pub index: usize,

    /// Line label, if one could be read.
    pub line: Option<String>,

    /// What was wrong with it.
    pub error: ConversionError,
}

/// Output of processing one service list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedServices {
    /// Rows ready for display, sorted by line.
    pub rows: Vec<DisplayServiceRow>,

    /// Records that were dropped.
    pub malformed: Vec<MalformedRecord>,
}

/// Convert, sort and format a list of raw service records.
pub fn process_services(records: &[RawServiceRecord]) -> ProcessedServices {
    let mut services = Vec::with_capacity(records.len());
    let mut malformed = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match convert_service(record) {
            Ok(service) => services.push(service),
            Err(error) => {
                let bad = MalformedRecord {
                    index,
                    line: record.line_hint().map(str::to_string),
                    error,
                };
                warn!(error = %bad, "dropping service record");
                malformed.push(bad);
            }
        }
    }

    // `sort_by` is stable, which the ordering rules rely on
    services.sort_by(|a, b| compare_lines(a.line.as_deref(), b.line.as_deref()));

    ProcessedServices {
        rows: services.iter().map(to_row).collect(),
        malformed,
    }
}

/// Format one service as a display row.
pub fn to_row(service: &BusService) -> DisplayServiceRow {
    let arrivals = service.arrivals.each_ref().map(|slot| {
        slot.as_ref().map(|arrival| ArrivalSlot {
            eta_text: compute_eta_text(arrival.duration_ms),
            clock_text: compute_clock_text(&arrival.time),
        })
    });

    DisplayServiceRow::new(
        service.line.as_deref().unwrap_or(NOT_AVAILABLE),
        service.operator.as_deref().unwrap_or(NOT_AVAILABLE),
        arrivals,
    )
}

/// Sort key for a line label.
///
/// Variant order is the sort order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum LineKey<'a> {
    Numbered(u64, &'a str),
    Named,
    Missing,
}

fn line_key(label: Option<&str>) -> LineKey<'_> {
    let Some(label) = label.map(str::trim) else {
        return LineKey::Missing;
    };

    let digits = label.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return LineKey::Named;
    }

    match label[..digits].parse() {
        Ok(number) => LineKey::Numbered(number, &label[digits..]),
        Err(_) => LineKey::Named,
    }
}

/// Compare two line labels.
pub fn compare_lines(a: Option<&str>, b: Option<&str>) -> Ordering {
    line_key(a).cmp(&line_key(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn record(no: &str) -> RawServiceRecord {
        RawServiceRecord::new(json!({ "no": no, "operator": "SBST" }))
    }

    fn lines(processed: &ProcessedServices) -> Vec<&str> {
        processed.rows.iter().map(DisplayServiceRow::line).collect()
    }

    #[test]
    fn numeric_labels_sort_by_value() {
        let processed = process_services(&[record("12"), record("2"), record("1A")]);
        assert_eq!(lines(&processed), vec!["1A", "2", "12"]);
    }

    #[test]
    fn suffix_breaks_ties_after_number() {
        let processed = process_services(&[
            record("10X"),
            record("10e"),
            record("100"),
            record("10"),
            record("9"),
        ]);
        assert_eq!(lines(&processed), vec!["9", "10", "10X", "10e", "100"]);
    }

    #[test]
    fn named_labels_follow_numbers_in_upstream_order() {
        let processed = process_services(&[
            record("NR8"),
            record("15"),
            record("CT18"),
            record("3"),
            record("BPS1"),
        ]);
        assert_eq!(lines(&processed), vec!["3", "15", "NR8", "CT18", "BPS1"]);
    }

    #[test]
    fn equal_keys_keep_upstream_order() {
        let records = vec![
            RawServiceRecord::new(json!({"no": "7", "operator": "first"})),
            RawServiceRecord::new(json!({"no": "07", "operator": "second"})),
            RawServiceRecord::new(json!({"no": "7", "operator": "third"})),
        ];
        let processed = process_services(&records);
        let operators: Vec<_> = processed.rows.iter().map(DisplayServiceRow::operator).collect();
        assert_eq!(operators, vec!["first", "second", "third"]);
    }

    #[test]
    fn missing_labels_sort_last_and_render_na() {
        let records = vec![
            RawServiceRecord::new(json!({"operator": "SMRT"})),
            record("15"),
            RawServiceRecord::new(json!({"no": "16"})),
        ];
        let processed = process_services(&records);

        assert_eq!(lines(&processed), vec!["15", "16", "N/A"]);
        assert_eq!(processed.rows[1].operator(), "N/A");
        assert_eq!(processed.rows[2].operator(), "SMRT");
    }

    #[test]
    fn slots_are_formatted() {
        let records = vec![RawServiceRecord::new(json!({
            "no": "15",
            "operator": "SBST",
            "next": {"time": "2024-03-15T09:05:00+08:00", "duration_ms": 90000},
            "next2": {"time": "2024-03-15T13:00:00+08:00", "duration_ms": -2000},
        }))];

        let processed = process_services(&records);
        let row = &processed.rows[0];

        let next = row.slot(0).unwrap();
        assert_eq!(next.eta_text, "2 minutes");
        assert_eq!(next.clock_text, "09:05 AM");

        let next2 = row.slot(1).unwrap();
        assert_eq!(next2.eta_text, "Now");
        assert_eq!(next2.clock_text, "13:00 PM");

        assert!(row.slot(2).is_none());
        assert_eq!(row.slot_text(2), "N/A");
    }

    #[test]
    fn malformed_rows_are_dropped_not_fatal() {
        let records = vec![
            record("15"),
            RawServiceRecord::new(json!({"no": "16", "next": {"time": "later", "duration_ms": 5}})),
            RawServiceRecord::new(json!({"no": 17})),
            RawServiceRecord::new(Value::Null),
            record("2"),
        ];

        let processed = process_services(&records);

        assert_eq!(lines(&processed), vec!["2", "15"]);
        assert_eq!(processed.malformed.len(), 3);

        assert_eq!(processed.malformed[0].index, 1);
        assert_eq!(processed.malformed[0].line.as_deref(), Some("16"));
        assert!(matches!(
            processed.malformed[0].error,
            ConversionError::InvalidTime { slot: 0, .. }
        ));

        assert_eq!(processed.malformed[1].index, 2);
        assert_eq!(processed.malformed[1].line, None);
        assert_eq!(processed.malformed[2].index, 3);
    }

    #[test]
    fn empty_input() {
        let processed = process_services(&[]);
        assert!(processed.rows.is_empty());
        assert!(processed.malformed.is_empty());
    }

    #[test]
    fn line_keys() {
        assert_eq!(line_key(Some("15")), LineKey::Numbered(15, ""));
        assert_eq!(line_key(Some(" 15 ")), LineKey::Numbered(15, ""));
        assert_eq!(line_key(Some("960e")), LineKey::Numbered(960, "e"));
        assert_eq!(line_key(Some("NR8")), LineKey::Named);
        assert_eq!(line_key(Some("")), LineKey::Named);
        // Too large for u64 falls back to a named label
        assert_eq!(line_key(Some("99999999999999999999999")), LineKey::Named);
        assert_eq!(line_key(None), LineKey::Missing);
    }

    #[test]
    fn malformed_display() {
        let bad = MalformedRecord {
            index: 4,
            line: None,
            error: ConversionError::Shape("expected a map".into()),
        };
        assert_eq!(
            bad.to_string(),
            "malformed service record #4: unexpected record shape: expected a map"
        );
    }
}
