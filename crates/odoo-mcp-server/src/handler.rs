//! JSON-RPC method handler for the MCP tool surface

use std::sync::Arc;

use async_trait::async_trait;
use odoo_mcp_json_rpc::{JsonRpcHandler, RequestParams};
use serde_json::Value;
use tracing::{debug, info};

use crate::envelope::normalize;
use crate::error::GatewayError;
use crate::operation::TOOL_PREFIX;
use crate::protocol::{
    CallToolParams, Implementation, InitializeRequest, InitializeResult, ListToolsResult,
    McpError, McpResult, ServerCapabilities, Tool, negotiate_version,
};
use crate::registry::OperationRegistry;
use crate::tools;

/// Methods answered by [`McpHandler`]
pub const MCP_METHODS: [&str; 5] = [
    "initialize",
    "ping",
    "tools/list",
    "tools/call",
    "notifications/initialized",
];

/// Serves `initialize`, `ping`, `tools/list` and `tools/call` from one registry
pub struct McpHandler {
    registry: Arc<OperationRegistry>,
    server_info: Implementation,
    instructions: Option<String>,
}

impl McpHandler {
    pub fn new(
        registry: Arc<OperationRegistry>,
        server_info: Implementation,
        instructions: Option<String>,
    ) -> Self {
        Self {
            registry,
            server_info,
            instructions,
        }
    }

    fn initialize(&self, params: Option<RequestParams>) -> McpResult<Value> {
        let request: Option<InitializeRequest> = params
            .map(|p| serde_json::from_value(p.into_value()))
            .transpose()
            .map_err(|e| McpError::InvalidParameters(e.to_string()))?;

        let client = request.as_ref().and_then(|r| r.client_info.as_ref());
        let requested = request.as_ref().and_then(|r| r.protocol_version.as_deref());
        let protocol_version = negotiate_version(requested);
        info!(
            client = client.map(|c| c.name.as_str()).unwrap_or("unknown"),
            protocol_version, "MCP session initialized"
        );

        let result = InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities::tools_only(),
            server_info: self.server_info.clone(),
            instructions: self.instructions.clone(),
        };
        Ok(serde_json::to_value(result)?)
    }

    fn list_tools(&self) -> McpResult<Value> {
        let tools: Vec<Tool> = self.registry.descriptors().iter().map(Tool::from).collect();
        Ok(serde_json::to_value(ListToolsResult { tools })?)
    }

    async fn call_tool(&self, params: Option<RequestParams>) -> McpResult<Value> {
        let params = params.ok_or_else(|| McpError::missing_param("name"))?;
        let call: CallToolParams = serde_json::from_value(params.into_value())
            .map_err(|e| McpError::InvalidParameters(e.to_string()))?;
        let arguments = call.arguments.unwrap_or(Value::Null);

        debug!(tool = %call.name, "tools/call");
        let envelope = match call.name.strip_prefix(TOOL_PREFIX) {
            Some(operation) => self.registry.dispatch(operation, arguments).await,
            None => normalize(Err(GatewayError::UnknownOperation(call.name.clone()))),
        };

        Ok(serde_json::to_value(tools::render(&call.name, &envelope))?)
    }
}

#[async_trait]
impl JsonRpcHandler for McpHandler {
    type Error = McpError;

    async fn handle(&self, method: &str, params: Option<RequestParams>) -> McpResult<Value> {
        match method {
            "initialize" => self.initialize(params),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => self.list_tools(),
            "tools/call" => self.call_tool(params).await,
            // Notification-only methods sent as requests
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    async fn handle_notification(&self, method: &str, _params: Option<RequestParams>) -> McpResult<()> {
        debug!(method, "Notification received");
        Ok(())
    }

    fn supported_methods(&self) -> Vec<String> {
        MCP_METHODS.iter().map(|m| m.to_string()).collect()
    }
}
