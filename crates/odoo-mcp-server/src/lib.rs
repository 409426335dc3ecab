//! # Odoo MCP Server
//!
//! The operation layer of the Odoo gateway and its MCP tool surface.
//!
//! - [`OperationRegistry`] resolves an operation name, applies the
//!   [`ConnectionGuard`], checks required parameters and runs the handler.
//! - Every outcome is an [`Envelope`]: `{"status":"success", ...}` or
//!   `{"status":"error","kind":...,"message":...}`. Surfaces only serialize it.
//! - [`McpServer`] exposes the registry as `odoo_*` tools over stdio.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use odoo_mcp_server::{McpServer, OperationRegistry};
//! use odoo_rpc_client::{ClientConfig, RpcConnection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connection = Arc::new(RpcConnection::new(ClientConfig::default()));
//!     let registry = Arc::new(OperationRegistry::new(connection));
//!
//!     let server = McpServer::builder()
//!         .name("odoo-mcp-server")
//!         .registry(registry)
//!         .build()?;
//!     server.run_stdio().await?;
//!     Ok(())
//! }
//! ```

pub mod arguments;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod handler;
pub mod handlers;
pub mod operation;
pub mod prelude;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod server;
pub mod stdio;
pub mod tools;

pub use arguments::Arguments;
pub use envelope::{Envelope, Payload, normalize};
pub use error::{ErrorKind, GatewayError, GatewayResult};
pub use guard::ConnectionGuard;
pub use handler::McpHandler;
pub use operation::{Operation, OperationDescriptor, TOOL_PREFIX};
pub use protocol::{CallToolResult, McpError, McpResult, Tool, ToolContent};
pub use registry::OperationRegistry;
pub use server::{McpServer, McpServerBuilder};
