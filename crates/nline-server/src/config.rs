//! Server configuration: YAML file, then `NLINE_*` environment overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Seconds of inactivity before a device is dropped.
    #[serde(default = "default_disconnect_timeout")]
    pub disconnect_timeout_secs: u64,

    /// Seconds between background reaper passes (0 disables the reaper).
    #[serde(default = "default_reap_interval")]
    pub reap_interval_secs: u64,
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_disconnect_timeout() -> u64 {
    300
}

fn default_reap_interval() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            disconnect_timeout_secs: default_disconnect_timeout(),
            reap_interval_secs: default_reap_interval(),
        }
    }
}

impl ServerConfig {
    /// Load a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `NLINE_BIND` | Listen address |
    /// | `NLINE_DISCONNECT_TIMEOUT` | Inactivity timeout in seconds |
    /// | `NLINE_REAP_INTERVAL` | Reaper period in seconds |
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `NLINE_*` variables on top of this config.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bind) = std::env::var("NLINE_BIND") {
            self.bind = bind;
        }
        if let Some(secs) = env_secs("NLINE_DISCONNECT_TIMEOUT") {
            self.disconnect_timeout_secs = secs;
        }
        if let Some(secs) = env_secs("NLINE_REAP_INTERVAL") {
            self.reap_interval_secs = secs;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "bind must be a socket address, got {:?}",
                self.bind
            )));
        }
        if self.disconnect_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "disconnect_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    pub fn with_disconnect_timeout(mut self, timeout: Duration) -> Self {
        self.disconnect_timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_reap_interval(mut self, interval: Duration) -> Self {
        self.reap_interval_secs = interval.as_secs();
        self
    }

    pub fn disconnect_timeout(&self) -> Duration {
        Duration::from_secs(self.disconnect_timeout_secs)
    }

    /// `None` when the reaper is disabled.
    pub fn reap_interval(&self) -> Option<Duration> {
        (self.reap_interval_secs > 0).then(|| Duration::from_secs(self.reap_interval_secs))
    }
}

fn env_secs(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
