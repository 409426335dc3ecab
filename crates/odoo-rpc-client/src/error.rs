//! Error types for Odoo RPC operations

use odoo_mcp_json_rpc::JsonRpcErrorObject;
use thiserror::Error;

/// Result type for Odoo RPC operations
pub type RpcResult<T> = Result<T, RpcError>;

/// Everything that can go wrong between the gateway and the ERP
#[derive(Error, Debug)]
pub enum RpcError {
    /// An operation other than connect was attempted without a session
    #[error("Not connected to Odoo. Use connect first.")]
    NotConnected,

    /// authenticate answered with a falsy identity, or refused the login
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The network call itself failed (DNS, TLS, refused, timeout, bad HTTP status)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The remote endpoint raised a fault
    #[error("Remote call failed: {0}")]
    RemoteCallFailed(String),

    /// The remote answered, but not with the shape the operation contract declares
    #[error("Unexpected result from '{method}': expected {expected}")]
    UnexpectedResult {
        method: String,
        expected: &'static str,
    },

    /// A blocking worker could not run or did not complete
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Transport-specific errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid JSON-RPC response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            TransportError::InvalidResponse(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl RpcError {
    /// Build a remote fault from the JSON-RPC error object Odoo returned.
    /// Only the human message is kept; the server traceback is dropped.
    pub fn remote(fault: &JsonRpcErrorObject) -> Self {
        Self::RemoteCallFailed(fault.detail_message().to_string())
    }

    pub fn unexpected(method: impl Into<String>, expected: &'static str) -> Self {
        Self::UnexpectedResult {
            method: method.into(),
            expected,
        }
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
