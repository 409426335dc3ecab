//! # Odoo HTTP Gateway
//!
//! HTTP/JSON surface over an [`OperationRegistry`](odoo_mcp_server::OperationRegistry).
//! Every operation is `POST /{operation}` with a JSON object body; the
//! response body is the operation's envelope and the status code follows its
//! error kind.
//!
//! | Route | Answer |
//! |---|---|
//! | `GET /` | service name, version, connection state, endpoint list |
//! | `GET /health` | `{"status":"healthy","connected":...}` |
//! | `POST /{operation}` | the operation envelope |
//! | `POST /models`, `POST /fields` | aliases of `get_models`, `get_fields` |
//! | `OPTIONS *` | `204` with CORS headers |

pub mod cors;
pub mod routes;
pub mod server;

pub use cors::CorsLayer;
pub use routes::{GatewayRouter, status_for};
pub use server::{HttpGatewayServer, HttpGatewayServerBuilder, ServerConfig};

/// Result type for the HTTP surface
pub type Result<T> = std::result::Result<T, HttpGatewayError>;

/// Failures starting or running the HTTP listener
#[derive(Debug, thiserror::Error)]
pub enum HttpGatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
