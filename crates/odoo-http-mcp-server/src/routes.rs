//! Request routing for the HTTP surface

use std::sync::Arc;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use odoo_mcp_server::{Envelope, ErrorKind, GatewayError, Operation, OperationRegistry};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::cors::CorsLayer;
use crate::server::ServerConfig;

/// Short paths kept for clients of the earlier HTTP API
const ALIASES: [(&str, Operation); 2] = [
    ("models", Operation::GetModels),
    ("fields", Operation::GetFields),
];

/// HTTP status for an error envelope of the given kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotConnected | ErrorKind::MissingParameter | ErrorKind::InvalidParameter => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::AuthenticationFailed => StatusCode::UNAUTHORIZED,
        ErrorKind::UnknownOperation => StatusCode::NOT_FOUND,
        ErrorKind::TransportError => StatusCode::BAD_GATEWAY,
        ErrorKind::RemoteCallFailed | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn resolve(segment: &str) -> Option<Operation> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == segment)
        .map(|(_, op)| *op)
        .or_else(|| Operation::from_name(segment))
}

/// Maps requests onto registry operations and envelopes onto responses
pub struct GatewayRouter {
    registry: Arc<OperationRegistry>,
    config: ServerConfig,
    service: String,
    version: String,
}

impl GatewayRouter {
    pub fn new(
        registry: Arc<OperationRegistry>,
        config: ServerConfig,
        service: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            config,
            service: service.into(),
            version: version.into(),
        }
    }

    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    /// Every path the surface answers, in listing order
    pub fn endpoints() -> Vec<String> {
        let mut endpoints = vec!["/".to_string(), "/health".to_string()];
        endpoints.extend(Operation::ALL.iter().map(|op| format!("/{}", op.name())));
        endpoints.extend(ALIASES.iter().map(|(alias, _)| format!("/{alias}")));
        endpoints
    }

    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!("Handling {} {}", method, path);

        let mut response = if method == Method::OPTIONS {
            empty(StatusCode::NO_CONTENT)
        } else {
            match path.as_str() {
                "/" if method == Method::GET => self.index(),
                "/health" if method == Method::GET => json_response(
                    StatusCode::OK,
                    &json!({"status": "healthy", "connected": self.registry.is_connected()}),
                ),
                "/" | "/health" => method_not_allowed("GET"),
                path => match resolve(path.trim_start_matches('/')) {
                    None => {
                        warn!(path, "Unknown operation path");
                        envelope_response(&Envelope::error(&GatewayError::UnknownOperation(
                            path.trim_start_matches('/').to_string(),
                        )))
                    }
                    Some(operation) if method == Method::POST => {
                        self.invoke(operation, req.into_body()).await
                    }
                    Some(_) => method_not_allowed("POST"),
                },
            }
        };

        if self.config.enable_cors {
            CorsLayer::apply_cors_headers(response.headers_mut());
        }
        response
    }

    fn index(&self) -> Response<Full<Bytes>> {
        json_response(
            StatusCode::OK,
            &json!({
                "status": "ok",
                "service": self.service,
                "version": self.version,
                "connected": self.registry.is_connected(),
                "endpoints": Self::endpoints(),
            }),
        )
    }

    async fn invoke<B>(&self, operation: Operation, body: B) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let bytes = match Limited::new(body, self.config.max_body_size).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                let error = GatewayError::invalid(
                    "body",
                    &format!("at most {} bytes", self.config.max_body_size),
                );
                let mut response = envelope_response(&Envelope::error(&error));
                *response.status_mut() = StatusCode::PAYLOAD_TOO_LARGE;
                return response;
            }
            Err(e) => {
                warn!(%operation, "Failed to read request body: {}", e);
                return envelope_response(&Envelope::error(&GatewayError::invalid(
                    "body",
                    "a readable request body",
                )));
            }
        };

        let arguments = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Map::new())
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => value,
                Err(e) => {
                    warn!(%operation, "Malformed JSON body: {}", e);
                    return envelope_response(&Envelope::error(&GatewayError::invalid(
                        "body",
                        "a JSON object",
                    )));
                }
            }
        };

        envelope_response(&self.registry.execute(operation, arguments).await)
    }
}

fn envelope_response(envelope: &Envelope) -> Response<Full<Bytes>> {
    let status = envelope.error_kind().map_or(StatusCode::OK, status_for);
    json_response(status, &envelope.to_value())
}

fn json_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn method_not_allowed(allow: &'static str) -> Response<Full<Bytes>> {
    let error = GatewayError::invalid("method", allow);
    let mut response = json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &Envelope::error(&error).to_value(),
    );
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(allow));
    response
}

fn empty(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
