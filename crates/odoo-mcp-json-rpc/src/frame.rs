//! Newline-delimited JSON-RPC framing for the stdio tool surface.
//!
//! Pure parsing only: the read loop lives in the server crate and calls
//! [`parse_line`] once per line read from stdin.

use serde_json::Value;

use crate::error::JsonRpcError;
use crate::notification::JsonRpcNotification;
use crate::request::JsonRpcRequest;
use crate::types::RequestId;

/// Maximum accepted line length (10 MB).
///
/// Checked on the raw byte length before any JSON parsing.
pub const MAX_MESSAGE_BYTES: usize = 10 * 1024 * 1024;

/// A classified inbound message
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// Has both `method` and `id`: a response must be written
    Request(JsonRpcRequest),
    /// Has `method` but no `id`: never answered
    Notification(JsonRpcNotification),
}

impl IncomingMessage {
    pub fn method(&self) -> &str {
        match self {
            IncomingMessage::Request(request) => &request.method,
            IncomingMessage::Notification(notification) => &notification.method,
        }
    }
}

/// Parse one line into an [`IncomingMessage`].
///
/// Returns `Ok(None)` for blank lines. Errors are ready-to-send JSON-RPC error
/// responses: `-32700` for unparseable JSON (null id), `-32600` for batches,
/// oversized lines and anything that is neither a request nor a notification
/// (carrying the id when one could be recovered).
pub fn parse_line(line: &str) -> Result<Option<IncomingMessage>, JsonRpcError> {
    if line.len() > MAX_MESSAGE_BYTES {
        return Err(JsonRpcError::invalid_request(None));
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|_| JsonRpcError::parse_error())?;

    // Batches are not supported by the tool protocol
    if value.is_array() {
        return Err(JsonRpcError::invalid_request(None));
    }

    let recovered_id = value
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

    let has_method = value.get("method").is_some_and(Value::is_string);
    let has_id = value.get("id").is_some_and(|id| !id.is_null());

    match (has_method, has_id) {
        (true, true) => serde_json::from_value::<JsonRpcRequest>(value)
            .map(|request| Some(IncomingMessage::Request(request)))
            .map_err(|_| JsonRpcError::invalid_request(recovered_id)),
        (true, false) => serde_json::from_value::<JsonRpcNotification>(value)
            .map(|notification| Some(IncomingMessage::Notification(notification)))
            .map_err(|_| JsonRpcError::invalid_request(None)),
        _ => Err(JsonRpcError::invalid_request(recovered_id)),
    }
}
