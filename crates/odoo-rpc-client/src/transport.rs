//! Transport abstraction for Odoo RPC calls
//!
//! Calls are synchronous: every invocation runs on a worker from
//! [`WorkerPool`](crate::pool::WorkerPool), never on the async runtime.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::RpcResult;

pub mod http;

pub use http::JsonRpcHttpTransport;

/// Remote services exposed by the Odoo RPC endpoint
pub mod services {
    /// Login and version queries (`authenticate`, `version`)
    pub const COMMON: &str = "common";
    /// Model method execution (`execute_kw`)
    pub const OBJECT: &str = "object";
}

/// One endpoint able to run `service.method(*args)` on the ERP
pub trait RpcTransport: Send + Sync + fmt::Debug {
    /// Perform one blocking remote call and return its raw result
    fn call(&self, service: &str, method: &str, args: Vec<Value>) -> RpcResult<Value>;

    /// Endpoint this transport talks to, for logging
    fn endpoint(&self) -> &str;
}

/// Creates a transport for a server URL on every connect
pub trait TransportFactory: Send + Sync {
    fn create(&self, url: &str, config: &ClientConfig) -> RpcResult<Arc<dyn RpcTransport>>;
}

/// Default factory producing [`JsonRpcHttpTransport`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransportFactory;

impl TransportFactory for HttpTransportFactory {
    fn create(&self, url: &str, config: &ClientConfig) -> RpcResult<Arc<dyn RpcTransport>> {
        Ok(Arc::new(JsonRpcHttpTransport::new(url, config)?))
    }
}
