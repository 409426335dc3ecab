//! # Odoo RPC Client
//!
//! The gateway's single link to an Odoo database: authentication lifecycle,
//! `execute_kw` marshalling with the exact argument shapes the ORM expects,
//! and a bounded pool that keeps blocking network calls off the async runtime.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use odoo_rpc_client::{ClientConfig, ConnectionParams, RpcConnection};
//!
//! # async fn example() -> Result<(), odoo_rpc_client::RpcError> {
//! let connection = RpcConnection::new(ClientConfig::default());
//! connection
//!     .connect(ConnectionParams::new("http://localhost:8069", "odoo", "admin", "admin"))
//!     .await?;
//!
//! let partners = connection
//!     .search_read("res.partner", vec![], &["name".to_string()], Some(5))
//!     .await?;
//! println!("{} partners", partners.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Transports
//!
//! Calls go through the [`RpcTransport`] trait. The default
//! [`JsonRpcHttpTransport`] posts to `{url}/jsonrpc`; tests plug in an
//! in-memory backend through a [`TransportFactory`].

pub mod config;
pub mod connection;
pub mod error;
pub mod operations;
pub mod pool;
pub mod prelude;
pub mod transport;

pub use config::{ClientConfig, ConnectionParams, PartialConnectionParams};
pub use connection::{ConnectionStatus, RpcConnection, SessionInfo};
pub use error::{RpcError, RpcResult, TransportError};
pub use operations::{DEFAULT_LIMIT, ReadGroupRequest, Record};
pub use pool::WorkerPool;
pub use transport::{
    HttpTransportFactory, JsonRpcHttpTransport, RpcTransport, TransportFactory, services,
};
