//! Conversion from arrivelah DTOs to domain types.

use chrono::DateTime;

use crate::domain::{ARRIVAL_SLOTS, Arrival, BusService};

use super::types::{ArrivalDto, RawServiceRecord};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Record does not have the shape of a service
    #[error("unexpected record shape: {0}")]
    Shape(String),

    /// Arrival timestamp is not RFC 3339
    #[error("invalid time in slot {slot}: {value}")]
    InvalidTime { slot: usize, value: String },
}

/// Convert one raw service record to a `BusService`.
pub fn convert_service(record: &RawServiceRecord) -> Result<BusService, ConversionError> {
    let dto = record
        .decode()
        .map_err(|e| ConversionError::Shape(e.to_string()))?;

    let mut arrivals: [Option<Arrival>; ARRIVAL_SLOTS] = Default::default();
    for (slot, (target, source)) in arrivals.iter_mut().zip(dto.arrival_slots()).enumerate() {
        if let Some(source) = source {
            *target = Some(convert_arrival(slot, source)?);
        }
    }

    Ok(BusService {
        line: dto.no,
        operator: dto.operator,
        arrivals,
    })
}

fn convert_arrival(slot: usize, dto: &ArrivalDto) -> Result<Arrival, ConversionError> {
    let time =
        DateTime::parse_from_rfc3339(&dto.time).map_err(|_| ConversionError::InvalidTime {
            slot,
            value: dto.time.clone(),
        })?;

    Ok(Arrival {
        duration_ms: dto.duration_ms,
        time,
    })
}
