//! Gateway error taxonomy
//!
//! Every failure an operation can hit is one of these variants. The
//! dispatcher turns them into error envelopes; nothing here ever reaches a
//! surface as a raw fault.

use odoo_rpc_client::RpcError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Not connected to Odoo. Use connect first.")]
    NotConnected,

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter '{param}': expected {expected}")]
    InvalidParameter { param: String, expected: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    RemoteCallFailed(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error category, serialized as snake_case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotConnected,
    MissingParameter,
    InvalidParameter,
    AuthenticationFailed,
    TransportError,
    RemoteCallFailed,
    UnknownOperation,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotConnected => "not_connected",
            ErrorKind::MissingParameter => "missing_parameter",
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::AuthenticationFailed => "authentication_failed",
            ErrorKind::TransportError => "transport_error",
            ErrorKind::RemoteCallFailed => "remote_call_failed",
            ErrorKind::UnknownOperation => "unknown_operation",
            ErrorKind::Internal => "internal",
        }
    }

    /// Caller mistakes, as opposed to remote or server-side failures
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::NotConnected
                | ErrorKind::MissingParameter
                | ErrorKind::InvalidParameter
                | ErrorKind::AuthenticationFailed
                | ErrorKind::UnknownOperation
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::NotConnected => ErrorKind::NotConnected,
            GatewayError::MissingParameter(_) => ErrorKind::MissingParameter,
            GatewayError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            GatewayError::AuthenticationFailed(_) => ErrorKind::AuthenticationFailed,
            GatewayError::Transport(_) => ErrorKind::TransportError,
            GatewayError::RemoteCallFailed(_) => ErrorKind::RemoteCallFailed,
            GatewayError::UnknownOperation(_) => ErrorKind::UnknownOperation,
            GatewayError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn missing(param: &str) -> Self {
        Self::MissingParameter(param.to_string())
    }

    pub fn invalid(param: &str, expected: &str) -> Self {
        Self::InvalidParameter {
            param: param.to_string(),
            expected: expected.to_string(),
        }
    }
}

impl From<RpcError> for GatewayError {
    fn from(error: RpcError) -> Self {
        match error {
            RpcError::NotConnected => GatewayError::NotConnected,
            RpcError::AuthenticationFailed(message) => GatewayError::AuthenticationFailed(message),
            RpcError::Transport(transport) => GatewayError::Transport(transport.to_string()),
            RpcError::RemoteCallFailed(message) => GatewayError::RemoteCallFailed(message),
            unexpected @ RpcError::UnexpectedResult { .. } => {
                GatewayError::RemoteCallFailed(unexpected.to_string())
            }
            RpcError::WorkerPool(message) => GatewayError::Internal(message),
            RpcError::Config(message) => GatewayError::Internal(message),
        }
    }
}
