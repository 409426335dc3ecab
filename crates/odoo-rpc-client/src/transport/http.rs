//! HTTP transport speaking Odoo's JSON-RPC endpoint

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use odoo_mcp_json_rpc::{JsonRpcMessage, JsonRpcRequest, RequestId};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{RpcError, RpcResult, TransportError};
use crate::transport::RpcTransport;

/// Path of the JSON-RPC dispatcher relative to the server URL
pub const JSONRPC_PATH: &str = "jsonrpc";

/// Blocking JSON-RPC transport for one Odoo server.
///
/// The underlying blocking client owns its own runtime, so it is built
/// lazily on the first call, which always happens on a pool worker.
pub struct JsonRpcHttpTransport {
    endpoint: Url,
    config: ClientConfig,
    client: Mutex<Option<reqwest::blocking::Client>>,
    request_counter: AtomicU64,
}

impl JsonRpcHttpTransport {
    pub fn new(url: &str, config: &ClientConfig) -> Result<Self, TransportError> {
        let endpoint = Self::endpoint_for(url)?;
        Ok(Self {
            endpoint,
            config: config.clone(),
            client: Mutex::new(None),
            request_counter: AtomicU64::new(0),
        })
    }

    /// Resolve `{url}/jsonrpc`, accepting only http and https servers
    pub fn endpoint_for(url: &str) -> Result<Url, TransportError> {
        let base = Url::parse(url.trim())
            .map_err(|e| TransportError::InvalidUrl(format!("{url}: {e}")))?;

        match base.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(TransportError::InvalidUrl(format!(
                    "unsupported scheme '{scheme}', expected http or https"
                )));
            }
        }

        let joined = format!("{}/{JSONRPC_PATH}", base.as_str().trim_end_matches('/'));
        Url::parse(&joined).map_err(|e| TransportError::InvalidUrl(format!("{joined}: {e}")))
    }

    fn client(&self) -> Result<reqwest::blocking::Client, TransportError> {
        let mut slot = self.client.lock();
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.request_timeout)
            .user_agent(self.config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Http(format!("failed to build HTTP client: {e}")))?;
        *slot = Some(client.clone());
        Ok(client)
    }

    fn next_request_id(&self) -> RequestId {
        RequestId::Number(self.request_counter.fetch_add(1, Ordering::Relaxed) as i64 + 1)
    }
}

impl fmt::Debug for JsonRpcHttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpcHttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("request_timeout", &self.config.request_timeout)
            .finish()
    }
}

impl RpcTransport for JsonRpcHttpTransport {
    fn call(&self, service: &str, method: &str, args: Vec<Value>) -> RpcResult<Value> {
        let id = self.next_request_id();
        let request = JsonRpcRequest::service_call(id.clone(), service, method, args);

        // args carry the password: log only the routing
        debug!(endpoint = %self.endpoint, service, method, %id, "Sending RPC call");

        let response = self
            .client()?
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .map_err(TransportError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::Http(format!(
                "HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            ))
            .into());
        }

        let body: Value = response
            .json()
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
        trace!(%id, "Received RPC reply");

        let message: JsonRpcMessage = serde_json::from_value(body)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        message.into_result().map_err(|fault| RpcError::remote(&fault.error))
    }

    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}
