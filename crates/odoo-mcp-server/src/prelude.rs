//! Commonly used gateway types
//!
//! ```rust
//! use odoo_mcp_server::prelude::*;
//! ```

pub use crate::envelope::{Envelope, Payload};
pub use crate::error::{ErrorKind, GatewayError, GatewayResult};
pub use crate::operation::{Operation, OperationDescriptor};
pub use crate::registry::OperationRegistry;
pub use crate::server::{McpServer, McpServerBuilder};

pub use odoo_rpc_client::prelude::*;
