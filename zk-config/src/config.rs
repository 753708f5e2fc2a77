//! Configuration client settings.

use crate::error::{ConfigError, ConfigResult};
use rust_common::{optional_env, parse_env_with, required_env};
use std::time::Duration;

/// Default interval between background refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
/// Default timeout for establishing a session.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);
/// Default session timeout negotiated with the ensemble.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration client settings. Immutable once the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Coordination-service endpoints as `host:port`
    pub hosts: Vec<String>,
    /// Name of the owning service; selects the service document
    pub service_name: String,
    /// Shared library name; selects the common document when set
    pub common_lib_name: Option<String>,
    /// Interval between background refreshes
    pub refresh_interval: Duration,
    /// Timeout for establishing a session
    pub connection_timeout: Duration,
    /// Session timeout
    pub session_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for one ensemble and service.
    #[must_use]
    pub fn new(hosts: Vec<String>, service_name: impl Into<String>) -> Self {
        Self {
            hosts,
            service_name: service_name.into(),
            common_lib_name: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }

    /// Load from the process environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_lookup`].
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(rust_common::process_env)
    }

    /// Load from an arbitrary variable lookup.
    ///
    /// Reads `ZK_HOSTS` (comma separated) or `ZK_HOST`/`ZK_PORT`,
    /// `SERVICE_NAME`, `COMMON_LIB_NAME`, `ZK_REFRESH_INTERVAL_SECS`,
    /// `ZK_CONNECTION_TIMEOUT_SECS` and `ZK_SESSION_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Configuration`] when `SERVICE_NAME` is missing
    /// and [`ConfigError::Platform`] when a numeric variable is malformed.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_name = required_env(&lookup, "SERVICE_NAME").map_err(|_| {
            ConfigError::configuration("SERVICE_NAME environment variable is required")
        })?;

        let hosts = match optional_env(&lookup, "ZK_HOSTS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(String::from)
                .collect(),
            None => {
                let host =
                    optional_env(&lookup, "ZK_HOST").unwrap_or_else(|| "localhost".to_string());
                let port: u16 = parse_env_with(&lookup, "ZK_PORT", 2181)?;
                vec![format!("{host}:{port}")]
            }
        };

        let config = Self {
            hosts,
            service_name,
            common_lib_name: optional_env(&lookup, "COMMON_LIB_NAME"),
            refresh_interval: Duration::from_secs(parse_env_with(
                &lookup,
                "ZK_REFRESH_INTERVAL_SECS",
                DEFAULT_REFRESH_INTERVAL.as_secs(),
            )?),
            connection_timeout: Duration::from_secs(parse_env_with(
                &lookup,
                "ZK_CONNECTION_TIMEOUT_SECS",
                DEFAULT_CONNECTION_TIMEOUT.as_secs(),
            )?),
            session_timeout: Duration::from_secs(parse_env_with(
                &lookup,
                "ZK_SESSION_TIMEOUT_SECS",
                DEFAULT_SESSION_TIMEOUT.as_secs(),
            )?),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants required before connecting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Configuration`] naming the offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::configuration("service name is required"));
        }
        if self.hosts.is_empty() {
            return Err(ConfigError::configuration("at least one host is required"));
        }
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::configuration("refresh interval must be positive"));
        }
        Ok(())
    }

    /// Path of the service document.
    #[must_use]
    pub fn service_path(&self) -> String {
        format!("/config/{}/config-properties", self.service_name)
    }

    /// Path of the common document, if a common library is configured.
    #[must_use]
    pub fn common_path(&self) -> Option<String> {
        self.common_lib_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| format!("/config/application/{name}"))
    }

    /// Hosts joined into a connect string.
    #[must_use]
    pub fn connect_string(&self) -> String {
        self.hosts.join(",")
    }

    /// Set the common library name.
    #[must_use]
    pub fn with_common_lib_name(mut self, name: impl Into<String>) -> Self {
        self.common_lib_name = Some(name.into());
        self
    }

    /// Set the refresh interval.
    #[must_use]
    pub const fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the session timeout.
    #[must_use]
    pub const fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }
}
