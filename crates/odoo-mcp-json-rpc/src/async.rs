use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{JsonRpcError, JsonRpcErrorObject},
    notification::JsonRpcNotification,
    request::{JsonRpcRequest, RequestParams},
    response::{JsonRpcMessage, ResponseResult},
};

/// Trait for handling JSON-RPC method calls
#[async_trait]
pub trait JsonRpcHandler: Send + Sync {
    /// The error type returned by this handler
    type Error: ToJsonRpcError;

    /// Handle a JSON-RPC method call.
    /// Returns domain errors only; the dispatcher converts them to JSON-RPC errors.
    async fn handle(&self, method: &str, params: Option<RequestParams>)
    -> Result<Value, Self::Error>;

    /// Handle a JSON-RPC notification (default does nothing)
    async fn handle_notification(
        &self,
        method: &str,
        params: Option<RequestParams>,
    ) -> Result<(), Self::Error> {
        let _ = (method, params);
        Ok(())
    }

    /// List supported methods (used for registration)
    fn supported_methods(&self) -> Vec<String> {
        vec![]
    }
}

/// Trait for errors that can be converted to JSON-RPC error objects
pub trait ToJsonRpcError: std::error::Error + Send + Sync + 'static {
    /// Convert this error to a JSON-RPC error object
    fn to_error_object(&self) -> JsonRpcErrorObject;
}

/// JSON-RPC method dispatcher with specific error type
pub struct JsonRpcDispatcher<E>
where
    E: ToJsonRpcError,
{
    handlers: HashMap<String, Arc<dyn JsonRpcHandler<Error = E>>>,
}

impl<E> JsonRpcDispatcher<E>
where
    E: ToJsonRpcError,
{
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a specific method
    pub fn register_method<H>(&mut self, method: impl Into<String>, handler: H)
    where
        H: JsonRpcHandler<Error = E> + 'static,
    {
        self.handlers.insert(method.into(), Arc::new(handler));
    }

    /// Register one handler under every method it reports in `supported_methods`
    pub fn register_handler<H>(&mut self, handler: H)
    where
        H: JsonRpcHandler<Error = E> + 'static,
    {
        let handler: Arc<dyn JsonRpcHandler<Error = E>> = Arc::new(handler);
        for method in handler.supported_methods() {
            self.handlers.insert(method, Arc::clone(&handler));
        }
    }

    /// Process a JSON-RPC request and return a response
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcMessage {
        match self.handlers.get(&request.method) {
            Some(handler) => match handler.handle(&request.method, request.params).await {
                Ok(result) => JsonRpcMessage::success(request.id, ResponseResult::Success(result)),
                Err(domain_error) => {
                    debug!(method = %request.method, error = %domain_error, "handler returned error");
                    let error_object = domain_error.to_error_object();
                    JsonRpcMessage::error(JsonRpcError::new(Some(request.id), error_object))
                }
            },
            None => JsonRpcMessage::error(JsonRpcError::method_not_found(
                request.id,
                &request.method,
            )),
        }
    }

    /// Process a JSON-RPC notification. Unknown methods are ignored.
    pub async fn handle_notification(&self, notification: JsonRpcNotification) -> Result<(), E> {
        match self.handlers.get(&notification.method) {
            Some(handler) => {
                handler
                    .handle_notification(&notification.method, notification.params)
                    .await
            }
            None => Ok(()),
        }
    }
}

impl<E> Default for JsonRpcDispatcher<E>
where
    E: ToJsonRpcError,
{
    fn default() -> Self {
        Self::new()
    }
}
