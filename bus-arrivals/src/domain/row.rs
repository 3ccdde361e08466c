//! Display-ready arrival rows.

use super::service::ARRIVAL_SLOTS;

/// Placeholder for missing values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Formatted texts for one arrival slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalSlot {
    /// Time until arrival, e.g. "2 minutes" or "Now".
    pub eta_text: String,

    /// Clock time of arrival, e.g. "09:05 AM".
    pub clock_text: String,
}

impl ArrivalSlot {
    /// Table cell text, e.g. "09:05 AM (2 minutes)".
    pub fn cell_text(&self) -> String {
        format!("{} ({})", self.clock_text, self.eta_text)
    }
}

/// One row of the arrivals table.
///
/// Rows are derived from upstream data and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayServiceRow {
    line: String,
    operator: String,
    arrivals: [Option<ArrivalSlot>; ARRIVAL_SLOTS],
}

impl DisplayServiceRow {
    /// Create a row from already formatted parts.
    pub fn new(
        line: impl Into<String>,
        operator: impl Into<String>,
        arrivals: [Option<ArrivalSlot>; ARRIVAL_SLOTS],
    ) -> Self {
        Self {
            line: line.into(),
            operator: operator.into(),
            arrivals,
        }
    }

    /// Bus line label, or "N/A".
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Operator label, or "N/A".
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// All arrival slots, soonest first.
    pub fn arrivals(&self) -> &[Option<ArrivalSlot>; ARRIVAL_SLOTS] {
        &self.arrivals
    }

    /// The arrival in slot `index`, if present.
    pub fn slot(&self, index: usize) -> Option<&ArrivalSlot> {
        self.arrivals.get(index).and_then(Option::as_ref)
    }

    /// Cell text for slot `index`, "N/A" when absent.
    pub fn slot_text(&self, index: usize) -> String {
        self.slot(index)
            .map(ArrivalSlot::cell_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}
