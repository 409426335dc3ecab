//! Commonly used client types
//!
//! ```rust
//! use odoo_rpc_client::prelude::*;
//! ```

pub use crate::config::{ClientConfig, ConnectionParams, PartialConnectionParams};
pub use crate::connection::{ConnectionStatus, RpcConnection, SessionInfo};
pub use crate::error::{RpcError, RpcResult, TransportError};
pub use crate::operations::{ReadGroupRequest, Record};
pub use crate::transport::{RpcTransport, TransportFactory};

pub use std::time::Duration;
