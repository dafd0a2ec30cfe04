//! Server configuration.

use std::env;
use std::time::Duration;

/// Environment variable that overrides the bind host.
pub const HOST_ENV_VAR: &str = "FAKE_API_HOST";

const DEFAULT_BODY_READ_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Listener and lifecycle settings for the fake API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind. The port is always assigned by the OS.
    pub host: String,
    /// Upper bound on reading one request body.
    pub body_read_timeout: Duration,
    /// Upper bound on one whole call, from its headers to the written
    /// response. Calls past it get `408 Request Timeout` and are not recorded.
    pub request_timeout: Duration,
    /// How long `stop` waits for in-flight calls before forcing close.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host().to_string(),
            body_read_timeout: DEFAULT_BODY_READ_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

impl ServerConfig {
    /// Build the configuration from the environment.
    ///
    /// Uses `FAKE_API_HOST` for the bind host when set and non-empty.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = env::var(HOST_ENV_VAR) {
            if !host.is_empty() {
                config.host = host;
            }
        }
        config
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_body_read_timeout(mut self, timeout: Duration) -> Self {
        self.body_read_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }
}

/// Loopback, except on Linux where containers running the client under test
/// cannot reach a loopback-only listener on the host.
pub fn default_host() -> &'static str {
    if cfg!(target_os = "linux") {
        "0.0.0.0"
    } else {
        "127.0.0.1"
    }
}
