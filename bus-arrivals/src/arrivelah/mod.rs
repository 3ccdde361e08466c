//! arrivelah bus arrival API client.
//!
//! This module provides an HTTP client for the public arrivelah service,
//! which returns live arrival predictions for Singapore bus stops.
//!
//! Key characteristics of the API:
//! - One GET per stop: `/?id={stop}`, no authentication
//! - `services` is `null` for an unknown stop and `[]` when nothing is running
//! - Each service carries up to three predictions (`next`, `next2`, `next3`)
//!   with a millisecond countdown and an RFC 3339 timestamp

mod client;
mod convert;
mod error;
mod mock;
mod source;
mod types;

pub use client::{ArrivalClient, ArrivalClientConfig, classify_body};
pub use convert::{ConversionError, convert_service};
pub use error::{FailureKind, FetchError};
pub use mock::{MockArrivalClient, MockError};
pub use source::ArrivalSource;
pub use types::{ArrivalDto, ArrivalResponse, RawServiceRecord, ServiceDto};
