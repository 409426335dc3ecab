//! HTTP listener for the gateway

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use odoo_mcp_server::OperationRegistry;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::routes::GatewayRouter;
use crate::{HttpGatewayError, Result};

/// Configuration for the HTTP gateway
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Add CORS headers to every response
    pub enable_cors: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8000)),
            enable_cors: true,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Builder for [`HttpGatewayServer`]
pub struct HttpGatewayServerBuilder {
    config: ServerConfig,
    registry: Option<Arc<OperationRegistry>>,
    service: String,
    version: String,
}

impl HttpGatewayServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            registry: None,
            service: "odoo-mcp-gateway".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Name and version reported by `GET /`
    pub fn service(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.service = name.into();
        self.version = version.into();
        self
    }

    pub fn registry(mut self, registry: Arc<OperationRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<HttpGatewayServer> {
        let registry = self.registry.ok_or_else(|| {
            HttpGatewayError::Configuration("an operation registry is required".to_string())
        })?;
        Ok(HttpGatewayServer {
            router: Arc::new(GatewayRouter::new(
                registry,
                self.config.clone(),
                self.service,
                self.version,
            )),
            config: self.config,
        })
    }
}

impl Default for HttpGatewayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The HTTP surface over one operation registry
pub struct HttpGatewayServer {
    config: ServerConfig,
    router: Arc<GatewayRouter>,
}

impl HttpGatewayServer {
    pub fn builder() -> HttpGatewayServerBuilder {
        HttpGatewayServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn router(&self) -> &Arc<GatewayRouter> {
        &self.router
    }

    /// Bind the configured address and serve until the task is cancelled
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_address).await?;
        self.run_with_listener(listener).await
    }

    /// Serve on an already bound listener (tests bind port 0)
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        info!("HTTP gateway listening on {}", listener.local_addr()?);

        loop {
            let (stream, peer_addr) = listener.accept().await?;
            debug!("New connection from {}", peer_addr);

            let router = Arc::clone(&self.router);
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let router = Arc::clone(&router);
                    async move { Ok::<_, Infallible>(router.handle(req).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    if err.is_incomplete_message() {
                        debug!("Client disconnected (normal): {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }
}
