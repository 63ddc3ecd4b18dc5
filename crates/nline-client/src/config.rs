use serde::{Deserialize, Serialize};

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the game server.
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum retries for transient failures of idempotent requests.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Interval between polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `NLINE_SERVER_URL` | Server base URL |
    /// | `NLINE_TIMEOUT_MS` | Request timeout |
    /// | `NLINE_MAX_RETRIES` | Retries for transient GET failures |
    /// | `NLINE_POLL_INTERVAL_MS` | Polling interval |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("NLINE_SERVER_URL").unwrap_or_else(|_| default_server_url()),
            timeout_ms: env_parse("NLINE_TIMEOUT_MS").unwrap_or_else(default_timeout_ms),
            max_retries: env_parse("NLINE_MAX_RETRIES").unwrap_or_else(default_max_retries),
            poll_interval_ms: env_parse("NLINE_POLL_INTERVAL_MS")
                .unwrap_or_else(default_poll_interval_ms),
        }
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
