//! arrivelah API response DTOs.
//!
//! These types map directly to the JSON the API returns. Service records
//! are kept as raw JSON until conversion so that a single malformed record
//! can be dropped without failing the rest of the response.

use serde::Deserialize;
use serde_json::Value;

/// Top-level response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ArrivalResponse {
    /// Services calling at the stop. `None` when the field is `null` or
    /// absent, which the API uses for unknown stops.
    pub services: Option<Vec<RawServiceRecord>>,
}

/// One service record exactly as received.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawServiceRecord(Value);

impl RawServiceRecord {
    /// Wrap a JSON value as a service record.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Line label, if the record has a string `no` field.
    pub fn line_hint(&self) -> Option<&str> {
        self.0.get("no").and_then(Value::as_str)
    }

    /// Decode into the typed DTO.
    pub fn decode(&self) -> Result<ServiceDto, serde_json::Error> {
        ServiceDto::deserialize(&self.0)
    }
}

/// A service as described by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDto {
    /// Bus line label ("15", "960e").
    pub no: Option<String>,

    /// Operator code ("SBST", "SMRT", "TTS", "GAS").
    pub operator: Option<String>,

    /// Next arrival.
    pub next: Option<ArrivalDto>,

    /// Second arrival.
    pub next2: Option<ArrivalDto>,

    /// Third arrival.
    pub next3: Option<ArrivalDto>,
}

impl ServiceDto {
    /// Arrival predictions in slot order.
    pub fn arrival_slots(&self) -> [Option<&ArrivalDto>; 3] {
        [self.next.as_ref(), self.next2.as_ref(), self.next3.as_ref()]
    }
}

/// One arrival prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct ArrivalDto {
    /// Predicted arrival (RFC 3339 with offset).
    pub time: String,

    /// Milliseconds until arrival, negative when overdue.
    pub duration_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_null_services() {
        let response: ArrivalResponse = serde_json::from_str(r#"{"services": null}"#).unwrap();
        assert!(response.services.is_none());
    }

    #[test]
    fn parse_missing_services() {
        let response: ArrivalResponse = serde_json::from_str("{}").unwrap();
        assert!(response.services.is_none());
    }

    #[test]
    fn parse_services_keeps_raw_records() {
        let body = r#"{"services": [{"no": "15", "operator": "SBST"}, {"no": 7}]}"#;
        let response: ArrivalResponse = serde_json::from_str(body).unwrap();
        let services = response.services.unwrap();

        assert_eq!(services.len(), 2);
        assert_eq!(services[0].line_hint(), Some("15"));
        // Wrong type is kept for now and only rejected at decode time
        assert_eq!(services[1].line_hint(), None);
        assert!(services[1].decode().is_err());
    }

    #[test]
    fn decode_full_record() {
        let record = RawServiceRecord::new(json!({
            "no": "15",
            "operator": "SBST",
            "next": {"time": "2024-03-15T09:05:00+08:00", "duration_ms": 90000, "load": "SEA"},
            "next2": null,
            "subsequent": {"time": "2024-03-15T09:30:00+08:00", "duration_ms": 1590000},
        }));

        let dto = record.decode().unwrap();
        assert_eq!(dto.no.as_deref(), Some("15"));
        assert_eq!(dto.operator.as_deref(), Some("SBST"));

        let slots = dto.arrival_slots();
        assert_eq!(slots[0].unwrap().duration_ms, 90000);
        assert!(slots[1].is_none());
        assert!(slots[2].is_none());
    }

    #[test]
    fn decode_missing_fields_as_none() {
        let dto = RawServiceRecord::new(json!({})).decode().unwrap();
        assert!(dto.no.is_none());
        assert!(dto.operator.is_none());
        assert!(dto.arrival_slots().iter().all(Option::is_none));
    }
}
