//! Connection lifecycle and `execute_kw` marshalling

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, ConnectionParams};
use crate::error::{RpcError, RpcResult};
use crate::pool::WorkerPool;
use crate::transport::{HttpTransportFactory, RpcTransport, TransportFactory, services};

/// Whether a session is currently established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Disconnected,
    Connected,
}

/// Public view of the current session (no password)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub url: String,
    pub database: String,
    pub username: String,
    pub uid: i64,
}

/// An authenticated identity plus the transport it was established on.
/// Immutable once built; a reconnect swaps in a whole new one.
#[derive(Debug)]
struct Session {
    params: ConnectionParams,
    uid: i64,
    transport: Arc<dyn RpcTransport>,
}

impl Session {
    fn info(&self) -> SessionInfo {
        SessionInfo {
            url: self.params.url.clone(),
            database: self.params.database.clone(),
            username: self.params.username.clone(),
            uid: self.uid,
        }
    }
}

/// The single process-wide link to an Odoo database.
///
/// Readers take a snapshot of the current session, so a concurrent connect
/// never exposes a half-updated identity. Connects themselves are serialized;
/// a failed connect leaves the previous session untouched.
pub struct RpcConnection {
    config: ClientConfig,
    factory: Arc<dyn TransportFactory>,
    pool: WorkerPool,
    session: RwLock<Option<Arc<Session>>>,
    connect_lock: Mutex<()>,
}

impl RpcConnection {
    /// Create a disconnected connection talking JSON-RPC over HTTP
    pub fn new(config: ClientConfig) -> Self {
        Self::with_factory(config, Arc::new(HttpTransportFactory))
    }

    /// Create a disconnected connection with a custom transport factory
    pub fn with_factory(config: ClientConfig, factory: Arc<dyn TransportFactory>) -> Self {
        let pool = WorkerPool::new(config.worker_threads);
        Self {
            config,
            factory,
            pool,
            session: RwLock::new(None),
            connect_lock: Mutex::new(()),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        if self.session.read().is_some() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    pub fn session_info(&self) -> Option<SessionInfo> {
        self.session.read().as_ref().map(|session| session.info())
    }

    /// Authenticate and, on success, replace the current session wholesale
    pub async fn connect(&self, params: ConnectionParams) -> RpcResult<SessionInfo> {
        let _serialized = self.connect_lock.lock().await;

        let transport = self.factory.create(&params.url, &self.config)?;
        info!(
            url = %params.url,
            database = %params.database,
            username = %params.username,
            "Authenticating with Odoo"
        );

        let args = vec![
            json!(params.database),
            json!(params.username),
            json!(params.password),
            json!({}),
        ];
        let auth_transport = Arc::clone(&transport);
        let identity = match self
            .pool
            .submit(move || auth_transport.call(services::COMMON, "authenticate", args))
            .await
        {
            Ok(identity) => identity,
            Err(RpcError::RemoteCallFailed(message)) => {
                warn!(url = %params.url, "Authentication rejected: {}", message);
                return Err(RpcError::AuthenticationFailed(message));
            }
            Err(e) => {
                warn!(url = %params.url, error = %e, "Connect failed");
                return Err(e);
            }
        };

        let Some(uid) = identity.as_i64().filter(|uid| *uid > 0) else {
            warn!(url = %params.url, username = %params.username, "Authentication returned no user id");
            return Err(RpcError::AuthenticationFailed(format!(
                "invalid credentials for user '{}' on database '{}'",
                params.username, params.database
            )));
        };

        let session = Arc::new(Session {
            params,
            uid,
            transport,
        });
        let info = session.info();
        *self.session.write() = Some(session);

        info!(uid, url = %info.url, database = %info.database, "Connected to Odoo");
        Ok(info)
    }

    /// Drop the current session. Returns whether one existed.
    pub fn disconnect(&self) -> bool {
        let previous = self.session.write().take();
        if previous.is_some() {
            info!("Disconnected from Odoo");
        }
        previous.is_some()
    }

    fn current_session(&self) -> RpcResult<Arc<Session>> {
        self.session.read().clone().ok_or(RpcError::NotConnected)
    }

    /// Run `model.method(*args, **kwargs)` through `execute_kw`.
    ///
    /// `kwargs` is appended only when given, so positional-only calls keep
    /// their exact argument list.
    pub async fn execute(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Option<Map<String, Value>>,
    ) -> RpcResult<Value> {
        let session = self.current_session()?;
        debug!(model, method, uid = session.uid, "execute_kw");

        let mut call_args = vec![
            json!(session.params.database),
            json!(session.uid),
            json!(session.params.password),
            json!(model),
            json!(method),
            Value::Array(args),
        ];
        if let Some(kwargs) = kwargs {
            call_args.push(Value::Object(kwargs));
        }

        let result = self
            .pool
            .submit(move || {
                session
                    .transport
                    .call(services::OBJECT, "execute_kw", call_args)
            })
            .await;

        if let Err(e) = &result {
            warn!(model, method, error = %e, "execute_kw failed");
        }
        result
    }
}

impl std::fmt::Debug for RpcConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcConnection")
            .field("status", &self.status())
            .field("workers", &self.pool.size())
            .finish()
    }
}
