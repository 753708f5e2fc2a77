//! Logger construction on top of `tracing-subscriber`.
//!
//! Production deployments log JSON at `info`; every other environment gets
//! human-readable output at `debug`. `RUST_LOG` always wins over the
//! configured level.

use crate::{PlatformError, PlatformResult, env::optional_env};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Deployment environment, read from `ENVIRONMENT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local and integration environments
    #[default]
    Development,
    /// Production
    Production,
}

impl Environment {
    /// Parse an environment name. Anything other than `production` is
    /// treated as development.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    /// Environment name as logged.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name attached to startup logs
    pub service_name: String,
    /// Log level filter
    pub log_level: String,
    /// Whether to output JSON format
    pub json_output: bool,
    /// Deployment environment
    pub environment: Environment,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Development)
    }
}

impl TracingConfig {
    /// Preset for the given environment.
    #[must_use]
    pub fn for_environment(environment: Environment) -> Self {
        let (log_level, json_output) = match environment {
            Environment::Production => ("info", true),
            Environment::Development => ("debug", false),
        };

        Self {
            service_name: "rust-service".to_string(),
            log_level: log_level.to_string(),
            json_output,
            environment,
        }
    }

    /// Build from `ENVIRONMENT`, `LOG_LEVEL` and `SERVICE_NAME`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(crate::env::process_env)
    }

    /// Build from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = optional_env(&lookup, "ENVIRONMENT")
            .map(|name| Environment::parse(&name))
            .unwrap_or_default();

        let mut config = Self::for_environment(environment);
        if let Some(level) = optional_env(&lookup, "LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(name) = optional_env(&lookup, "SERVICE_NAME") {
            config.service_name = name;
        }
        config
    }

    /// Create config with custom service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Create config with custom log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON output.
    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Initialize tracing with the given configuration.
///
/// Installs the global subscriber. Should be called once at application
/// startup.
///
/// # Errors
///
/// Returns [`PlatformError::Internal`] if a global subscriber is already set.
pub fn init_tracing(config: &TracingConfig) -> PlatformResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = if config.json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };
    result.map_err(|e| PlatformError::internal(format!("tracing already initialized: {e}")))?;

    tracing::info!(
        service = %config.service_name,
        environment = config.environment.as_str(),
        level = %config.log_level,
        "Logger initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.service_name, "rust-service");
        assert_eq!(config.log_level, "debug");
        assert!(!config.json_output);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_production_preset() {
        let config = TracingConfig::for_environment(Environment::Production);
        assert_eq!(config.log_level, "info");
        assert!(config.json_output);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse("PRODUCTION"), Environment::Production);
        assert_eq!(Environment::parse("sit"), Environment::Development);
        assert_eq!(Environment::parse(""), Environment::Development);
    }

    #[test]
    fn test_from_lookup() {
        let config = TracingConfig::from_lookup(|name| match name {
            "ENVIRONMENT" => Some("production".to_string()),
            "LOG_LEVEL" => Some("warn".to_string()),
            "SERVICE_NAME" => Some("orders".to_string()),
            _ => None,
        });

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.service_name, "orders");
        assert!(config.json_output);
    }

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::default()
            .with_service_name("my-service")
            .with_log_level("trace")
            .with_json_output();

        assert_eq!(config.service_name, "my-service");
        assert_eq!(config.log_level, "trace");
        assert!(config.json_output);
    }

    #[test]
    fn test_second_init_is_an_error() {
        let config = TracingConfig::default();
        // Another test in this binary may have installed the subscriber first.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
