//! Live bus arrival client.
//!
//! Polls a public bus arrival API for a user-chosen stop and publishes a
//! sorted, display-ready view of upcoming arrivals, refreshed on a fixed
//! period and safe against out-of-order responses.

pub mod arrivelah;
pub mod board;
pub mod domain;
pub mod poller;
pub mod terminal;
