//! Uniform result envelopes shared by every surface
//!
//! Success: `{"status":"success", ...payload}`.
//! Failure: `{"status":"error", "kind": <snake_case>, "message": ...}`.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::error::{ErrorKind, GatewayError, GatewayResult};

/// Operation-specific fields of a successful result
pub type Payload = Map<String, Value>;

/// Outcome of one dispatched operation
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success(Payload),
    Error { kind: ErrorKind, message: String },
}

impl Envelope {
    pub fn success(payload: Payload) -> Self {
        Self::Success(payload)
    }

    pub fn error(error: &GatewayError) -> Self {
        Self::Error {
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Error { kind, .. } => Some(*kind),
        }
    }

    /// A top-level payload field, `None` for errors
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Envelope::Success(payload) => payload.get(key),
            Envelope::Error { .. } => None,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            // Map<String, Value> always serializes
            serde_json::json!({
                "status": "error",
                "kind": ErrorKind::Internal,
                "message": e.to_string(),
            })
        })
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Envelope::Success(payload) => {
                let mut map = serializer.serialize_map(Some(payload.len() + 1))?;
                map.serialize_entry("status", "success")?;
                for (key, value) in payload {
                    if key != "status" {
                        map.serialize_entry(key, value)?;
                    }
                }
                map.end()
            }
            Envelope::Error { kind, message } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("status", "error")?;
                map.serialize_entry("kind", kind)?;
                map.serialize_entry("message", message)?;
                map.end()
            }
        }
    }
}

/// Collapse a handler result into an envelope
pub fn normalize(result: GatewayResult<Payload>) -> Envelope {
    match result {
        Ok(payload) => Envelope::success(payload),
        Err(error) => Envelope::error(&error),
    }
}

/// Build a payload from `(key, value)` pairs
#[macro_export]
macro_rules! payload {
    ($($key:literal => $value:expr),* $(,)?) => {{
        let mut payload = $crate::envelope::Payload::new();
        $(payload.insert($key.to_string(), ::serde_json::json!($value));)*
        payload
    }};
}
