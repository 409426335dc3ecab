//! # JSON-RPC 2.0 for the Odoo MCP Gateway
//!
//! Transport-agnostic JSON-RPC 2.0 types used in both directions of the gateway:
//!
//! - **Inbound**: the stdio tool surface reads newline-delimited requests,
//!   classifies them with [`frame::parse_line`] and routes them through a
//!   [`JsonRpcDispatcher`].
//! - **Outbound**: the ERP client wraps every remote procedure call in a
//!   [`JsonRpcRequest`] and decodes the reply as a [`JsonRpcMessage`].
//!
//! No I/O happens in this crate.

pub mod error;
pub mod frame;
pub mod notification;
pub mod request;
pub mod response;
pub mod types;

pub mod r#async;

pub use error::{JsonRpcError, JsonRpcErrorObject};
pub use frame::{IncomingMessage, parse_line};
pub use notification::JsonRpcNotification;
pub use request::{JsonRpcRequest, RequestParams};
pub use response::{JsonRpcMessage, JsonRpcResponse, ResponseResult};
pub use types::{JsonRpcVersion, RequestId};

pub use r#async::{JsonRpcDispatcher, JsonRpcHandler, ToJsonRpcError};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
