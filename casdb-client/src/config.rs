//! Session configuration.

use casdb_protocol::DEFAULT_BROKER_PORT;
use std::time::Duration;

/// Configuration for a broker session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Broker address for rendezvous.
    pub host: String,
    /// Initial broker port.
    pub port: u16,
    /// Login identity.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Database to bind.
    pub database: String,
    /// Response-cache TTL in milliseconds; 0 disables the cache.
    pub cache_timeout_ms: u64,
    /// Additional handshake retries on transport errors.
    pub max_connection_retry_count: u32,
    /// Initial auto-commit mode; the server's echoed state takes over
    /// after the handshake.
    pub autocommit: bool,
    /// Alternate hosts. Reserved; no failover policy is attached yet.
    pub althosts: Vec<String>,
    /// Deadline for the whole handshake (rendezvous + login).
    pub login_timeout: Option<Duration>,
    /// Deadline for a single data-plane round trip.
    pub query_timeout: Option<Duration>,
    /// Whether a query timeout tears the connection down instead of
    /// leaving it usable.
    pub disconnect_on_query_timeout: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_BROKER_PORT,
            user: "public".to_string(),
            password: String::new(),
            database: "demodb".to_string(),
            cache_timeout_ms: 0,
            max_connection_retry_count: 1,
            autocommit: true,
            althosts: Vec::new(),
            login_timeout: None,
            query_timeout: None,
            disconnect_on_query_timeout: false,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_cache_timeout_ms(mut self, millis: u64) -> Self {
        self.cache_timeout_ms = millis;
        self
    }

    pub fn with_max_connection_retry_count(mut self, count: u32) -> Self {
        self.max_connection_retry_count = count;
        self
    }

    pub fn with_autocommit(mut self, on: bool) -> Self {
        self.autocommit = on;
        self
    }

    pub fn with_althosts(mut self, hosts: Vec<String>) -> Self {
        self.althosts = hosts;
        self
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = Some(timeout);
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn with_disconnect_on_query_timeout(mut self, disconnect: bool) -> Self {
        self.disconnect_on_query_timeout = disconnect;
        self
    }

    /// The cache TTL, or `None` when the cache is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        if self.cache_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.cache_timeout_ms))
        }
    }
}
