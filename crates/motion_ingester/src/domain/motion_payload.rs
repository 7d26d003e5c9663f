use common::domain::{DomainError, DomainResult};
use serde_json::{Map, Value};

/// Decoded body of an inbound motion message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionPayload {
    pub device_id: String,
    pub event_type: String,
    pub status: String,
    /// Device clock reading, stored verbatim
    pub timestamp_device: String,
}

impl MotionPayload {
    /// Decode a UTF-8 JSON object carrying the four required string fields.
    ///
    /// Any field that is missing, empty or not a string rejects the whole
    /// payload. Unknown fields are ignored.
    pub fn decode(payload: &[u8]) -> DomainResult<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|e| DomainError::InvalidPayload(format!("payload is not UTF-8: {}", e)))?;

        let value: Value = serde_json::from_str(text)
            .map_err(|e| DomainError::InvalidPayload(format!("payload is not JSON: {}", e)))?;

        let Value::Object(fields) = value else {
            return Err(DomainError::InvalidPayload(
                "payload must be a JSON object".to_string(),
            ));
        };

        Ok(Self {
            device_id: required_string(&fields, "device_id")?,
            event_type: required_string(&fields, "event_type")?,
            status: required_string(&fields, "status")?,
            timestamp_device: required_string(&fields, "timestamp_device")?,
        })
    }
}

fn required_string(fields: &Map<String, Value>, name: &str) -> DomainResult<String> {
    match fields.get(name) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(DomainError::InvalidPayload(format!(
            "field '{}' is empty",
            name
        ))),
        Some(_) => Err(DomainError::InvalidPayload(format!(
            "field '{}' must be a string",
            name
        ))),
        None => Err(DomainError::InvalidPayload(format!(
            "missing field '{}'",
            name
        ))),
    }
}
