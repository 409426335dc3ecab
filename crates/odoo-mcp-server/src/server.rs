//! MCP server assembly and builder

use std::sync::Arc;

use odoo_mcp_json_rpc::JsonRpcDispatcher;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

use crate::handler::McpHandler;
use crate::protocol::{Implementation, McpError, McpResult};
use crate::registry::OperationRegistry;
use crate::stdio::StdioTransport;

/// Default `serverInfo.name`
pub const DEFAULT_SERVER_NAME: &str = "odoo-mcp-server";

/// The MCP tool surface over one operation registry
pub struct McpServer {
    registry: Arc<OperationRegistry>,
    server_info: Implementation,
    transport: StdioTransport,
}

impl McpServer {
    pub fn builder() -> McpServerBuilder {
        McpServerBuilder::new()
    }

    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    pub fn server_info(&self) -> &Implementation {
        &self.server_info
    }

    /// Serve on the process's stdin/stdout
    pub async fn run_stdio(&self) -> McpResult<()> {
        info!(
            name = %self.server_info.name,
            version = %self.server_info.version,
            "Starting MCP server on stdio"
        );
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve on arbitrary streams (used by tests with in-memory pipes)
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> McpResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        self.transport.serve(reader, writer).await
    }
}

/// Builder for [`McpServer`]
pub struct McpServerBuilder {
    name: String,
    version: String,
    title: Option<String>,
    instructions: Option<String>,
    registry: Option<Arc<OperationRegistry>>,
}

impl McpServerBuilder {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: None,
            instructions: None,
            registry: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn registry(mut self, registry: Arc<OperationRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> McpResult<McpServer> {
        let registry = self
            .registry
            .ok_or_else(|| McpError::configuration("an operation registry is required"))?;

        let mut server_info = Implementation::new(self.name, self.version);
        if let Some(title) = self.title {
            server_info = server_info.with_title(title);
        }

        let mut dispatcher = JsonRpcDispatcher::new();
        dispatcher.register_handler(McpHandler::new(
            Arc::clone(&registry),
            server_info.clone(),
            self.instructions,
        ));

        Ok(McpServer {
            registry,
            server_info,
            transport: StdioTransport::new(Arc::new(dispatcher)),
        })
    }
}

impl Default for McpServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
