//! Domain types for bus arrivals.
//!
//! These are the validated, upstream-independent types the rest of the
//! crate works with: stop identifiers, bus services with their arrival
//! predictions, and the display rows derived from them.

mod row;
mod service;
mod stop;
mod time;

pub use row::{ArrivalSlot, DisplayServiceRow, NOT_AVAILABLE};
pub use service::{ARRIVAL_SLOTS, Arrival, BusService};
pub use stop::StopId;
pub use time::{ETA_NOW, compute_clock_text, compute_eta_text, eta_minutes, updated_at_text};
