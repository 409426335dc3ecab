//! Connection parameters and client configuration

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable holding the default server URL
pub const ENV_URL: &str = "ODOO_URL";
/// Environment variable holding the default database name
pub const ENV_DATABASE: &str = "ODOO_DATABASE";
/// Environment variable holding the default login
pub const ENV_USERNAME: &str = "ODOO_USERNAME";
/// Environment variable holding the default password
pub const ENV_PASSWORD: &str = "ODOO_PASSWORD";

/// Credentials and location of one Odoo database.
///
/// `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl ConnectionParams {
    pub fn new(
        url: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection parameters where any field may still be missing.
///
/// Empty strings are treated the same as absent values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PartialConnectionParams {
    pub url: Option<String>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl PartialConnectionParams {
    /// Read the `ODOO_*` variables from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, used with the real environment or a fixed map
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            url: non_empty(lookup(ENV_URL)),
            database: non_empty(lookup(ENV_DATABASE)),
            username: non_empty(lookup(ENV_USERNAME)),
            password: non_empty(lookup(ENV_PASSWORD)),
        }
    }

    /// Fill every field still missing here from `fallback`
    pub fn or(self, fallback: &PartialConnectionParams) -> Self {
        Self {
            url: non_empty(self.url).or_else(|| fallback.url.clone()),
            database: non_empty(self.database).or_else(|| fallback.database.clone()),
            username: non_empty(self.username).or_else(|| fallback.username.clone()),
            password: non_empty(self.password).or_else(|| fallback.password.clone()),
        }
    }

    /// Name of the first missing field, in `url, database, username, password` order
    pub fn first_missing(&self) -> Option<&'static str> {
        [
            ("url", &self.url),
            ("database", &self.database),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .find(|(_, value)| value.as_deref().is_none_or(str::is_empty))
        .map(|(name, _)| name)
    }

    /// Complete the parameters, or report the first missing field
    pub fn complete(self) -> Result<ConnectionParams, &'static str> {
        if let Some(missing) = self.first_missing() {
            return Err(missing);
        }
        Ok(ConnectionParams {
            url: self.url.unwrap_or_default(),
            database: self.database.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        })
    }
}

impl fmt::Debug for PartialConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialConnectionParams")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Client-side tuning
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on concurrent in-flight remote calls
    pub worker_threads: usize,
    /// Per-call timeout; `None` waits for the remote indefinitely
    pub request_timeout: Option<Duration>,
    /// User-Agent header sent with every call
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            worker_threads: 8,
            request_timeout: None,
            user_agent: format!("odoo-mcp-gateway/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
