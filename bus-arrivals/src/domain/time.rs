//! Arrival time formatting.
//!
//! Turns upstream durations and timestamps into the short strings shown
//! next to each arrival: an ETA such as "2 minutes" and a clock time such
//! as "09:05 AM". All functions here are total; they never fail.

use chrono::{DateTime, Datelike, TimeZone, Timelike};

/// Milliseconds in one minute.
const MS_PER_MINUTE: i64 = 60_000;

/// Text shown when a bus is due.
pub const ETA_NOW: &str = "Now";

/// Whole minutes until arrival, rounded up.
///
/// Negative durations round towards zero, so anything up to a minute
/// overdue is 0 and later ones are negative.
pub fn eta_minutes(duration_ms: i64) -> i64 {
    let minutes = duration_ms.div_euclid(MS_PER_MINUTE);
    if duration_ms.rem_euclid(MS_PER_MINUTE) == 0 {
        minutes
    } else {
        minutes + 1
    }
}

/// Human-readable time until arrival.
///
/// # Examples
///
/// ```
/// use bus_arrivals::domain::compute_eta_text;
///
/// assert_eq!(compute_eta_text(-5_000), "Now");
/// assert_eq!(compute_eta_text(0), "Now");
/// assert_eq!(compute_eta_text(1), "1 minute");
/// assert_eq!(compute_eta_text(90_000), "2 minutes");
/// ```
pub fn compute_eta_text(duration_ms: i64) -> String {
    let minutes = eta_minutes(duration_ms);
    if minutes <= 0 {
        return ETA_NOW.to_string();
    }
    pluralize(minutes, "minute")
}

fn pluralize(count: i64, unit: &str) -> String {
    if count >= 2 {
        format!("{count} {unit}s")
    } else {
        format!("{count} {unit}")
    }
}

/// Clock text for an arrival timestamp, e.g. "09:05 AM".
///
/// The hour is the raw 0-23 value of the timestamp in its own offset and
/// is not folded onto a 12-hour dial, so 13:00 renders as "13:00 PM".
///
/// # Examples
///
/// ```
/// use bus_arrivals::domain::compute_clock_text;
/// use chrono::{FixedOffset, TimeZone};
///
/// let sgt = FixedOffset::east_opt(8 * 3600).unwrap();
/// let t = sgt.with_ymd_and_hms(2024, 3, 15, 13, 0, 0).unwrap();
/// assert_eq!(compute_clock_text(&t), "13:00 PM");
/// ```
pub fn compute_clock_text<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String {
    let hour = timestamp.hour();
    let suffix = if hour < 12 { "AM" } else { "PM" };
    format!("{:02}:{:02} {}", hour, timestamp.minute(), suffix)
}

/// "Last updated" text, `DD/MM/YYYY/HH:MM:SS`.
///
/// The month is the calendar month (01-12), not a zero-based index.
pub fn updated_at_text<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String {
    format!(
        "{:02}/{:02}/{}/{:02}:{:02}:{:02}",
        timestamp.day(),
        timestamp.month(),
        timestamp.year(),
        timestamp.hour(),
        timestamp.minute(),
        timestamp.second()
    )
}
