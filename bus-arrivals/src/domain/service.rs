//! Validated bus service data.

use chrono::{DateTime, FixedOffset};

/// Number of upcoming arrivals reported per service.
pub const ARRIVAL_SLOTS: usize = 3;

/// One predicted arrival of a bus at the stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    /// Milliseconds until arrival. Negative when the bus is overdue.
    pub duration_ms: i64,

    /// Predicted arrival time, in the offset reported upstream.
    pub time: DateTime<FixedOffset>,
}

/// A bus service calling at the stop, with its next arrivals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusService {
    /// Line label, e.g. "15" or "960e".
    pub line: Option<String>,

    /// Operator name, e.g. "SBST".
    pub operator: Option<String>,

    /// Upcoming arrivals, soonest first. A slot is `None` when upstream
    /// has no prediction for it.
    pub arrivals: [Option<Arrival>; ARRIVAL_SLOTS],
}
