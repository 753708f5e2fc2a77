//! Typed settings read from the configuration documents.
//!
//! Every field is extracted with a checked conversion; a malformed document
//! yields a [`ConfigError`] rather than a panic.

use crate::{
    cache::Namespace,
    client::ConfigClient,
    error::{ConfigError, ConfigResult},
    manager::ConfigManager,
    value::ConfigValue,
};
use std::collections::BTreeMap;
use tracing::warn;

/// Common-namespace key holding the Redis connection settings.
pub const REDIS_CONFIG_KEY: &str = "REDIS_CONFIG";
/// Service-namespace key holding the database settings.
pub const DB_CONFIG_KEY: &str = "DB_CONFIG";
/// Common-namespace key holding the auth service base URL.
pub const AUTH_SERVICE_URL_KEY: &str = "AUTH_SERV_URL";

const DEFAULT_REDIS_HOST: &str = "localhost";
const DEFAULT_REDIS_PORT: u16 = 6379;

/// Anything that can answer raw configuration lookups.
pub trait ConfigSource {
    /// Look up a decoded value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KeyNotFound`] if the key is absent.
    fn config_value(&self, key: &str, namespace: Namespace) -> ConfigResult<ConfigValue>;
}

impl ConfigSource for ConfigClient {
    fn config_value(&self, key: &str, namespace: Namespace) -> ConfigResult<ConfigValue> {
        self.get_config_value_by_key(key, namespace)
    }
}

impl ConfigSource for ConfigManager {
    fn config_value(&self, key: &str, namespace: Namespace) -> ConfigResult<ConfigValue> {
        self.get_config_value_by_key(key, namespace)
    }
}

/// Redis connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisSettings {
    /// Redis host
    pub host: String,
    /// Redis port
    pub port: u16,
}

impl RedisSettings {
    /// Read `REDIS_CONFIG` from the common namespace.
    ///
    /// A missing or non-string `host` falls back to `localhost` and a missing
    /// `port` to `6379`, both with a warning. `port` may be an integer or a
    /// numeric string.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::KeyNotFound`] if `REDIS_CONFIG` is absent
    /// - [`ConfigError::Decode`] if it is not a mapping or the port is invalid
    pub fn load<S: ConfigSource + ?Sized>(source: &S) -> ConfigResult<Self> {
        let value = source.config_value(REDIS_CONFIG_KEY, Namespace::Common)?;
        let fields = as_fields(&value, Namespace::Common, REDIS_CONFIG_KEY)?;

        let host = match fields.get("host").map(ConfigValue::as_str) {
            Some(Ok(host)) if !host.is_empty() => host.to_string(),
            _ => {
                warn!(host = DEFAULT_REDIS_HOST, "Using default Redis host");
                DEFAULT_REDIS_HOST.to_string()
            }
        };

        let port = match fields.get("port") {
            Some(port) => port_number(port).ok_or_else(|| {
                ConfigError::decode(Namespace::Common, format!("invalid Redis port: {port}"))
            })?,
            None => {
                warn!(port = DEFAULT_REDIS_PORT, "Using default Redis port");
                DEFAULT_REDIS_PORT
            }
        };

        Ok(Self { host, port })
    }

    /// `host:port` address.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// Connection URL
    pub url: String,
    /// Maximum number of pooled connections
    pub max_pool_size: u32,
}

impl DatabaseSettings {
    /// Read `DB_CONFIG` from the service namespace.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::KeyNotFound`] if `DB_CONFIG` is absent
    /// - [`ConfigError::Decode`] if it is not a mapping, `url` is missing or
    ///   not a string, or `maxPoolSize` is missing or not a positive integer
    pub fn load<S: ConfigSource + ?Sized>(source: &S) -> ConfigResult<Self> {
        let value = source.config_value(DB_CONFIG_KEY, Namespace::Service)?;
        let fields = as_fields(&value, Namespace::Service, DB_CONFIG_KEY)?;

        let url = fields
            .get("url")
            .ok_or_else(|| ConfigError::decode(Namespace::Service, "DB_CONFIG.url is required"))?
            .as_str()
            .map_err(|e| ConfigError::decode(Namespace::Service, format!("DB_CONFIG.url: {e}")))?
            .to_string();

        let max_pool_size = fields
            .get("maxPoolSize")
            .ok_or_else(|| {
                ConfigError::decode(Namespace::Service, "DB_CONFIG.maxPoolSize is required")
            })
            .and_then(|v| {
                positive_u32(v).ok_or_else(|| {
                    ConfigError::decode(
                        Namespace::Service,
                        format!("DB_CONFIG.maxPoolSize must be a positive integer, got {v}"),
                    )
                })
            })?;

        Ok(Self { url, max_pool_size })
    }
}

/// Read `AUTH_SERV_URL` from the common namespace.
///
/// # Errors
///
/// Returns [`ConfigError::KeyNotFound`] if absent and
/// [`ConfigError::TypeMismatch`] if it is not a string.
pub fn auth_service_url<S: ConfigSource + ?Sized>(source: &S) -> ConfigResult<String> {
    source
        .config_value(AUTH_SERVICE_URL_KEY, Namespace::Common)?
        .as_str()
        .map(str::to_string)
}

fn as_fields<'a>(
    value: &'a ConfigValue,
    namespace: Namespace,
    key: &str,
) -> ConfigResult<&'a BTreeMap<String, ConfigValue>> {
    value
        .as_map()
        .map_err(|e| ConfigError::decode(namespace, format!("invalid {key} format: {e}")))
}

fn port_number(value: &ConfigValue) -> Option<u16> {
    match value {
        ConfigValue::String(s) => s.trim().parse().ok(),
        other => other.as_u64().ok().and_then(|n| u16::try_from(n).ok()),
    }
}

fn positive_u32(value: &ConfigValue) -> Option<u32> {
    let n = match value {
        ConfigValue::String(s) => s.trim().parse::<u32>().ok()?,
        other => u32::try_from(other.as_u64().ok()?).ok()?,
    };
    (n > 0).then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Default)]
    struct StaticSource(HashMap<(Namespace, String), ConfigValue>);

    impl StaticSource {
        fn with(mut self, namespace: Namespace, key: &str, value: serde_json::Value) -> Self {
            self.0.insert((namespace, key.to_string()), value.into());
            self
        }
    }

    impl ConfigSource for StaticSource {
        fn config_value(&self, key: &str, namespace: Namespace) -> ConfigResult<ConfigValue> {
            self.0
                .get(&(namespace, key.to_string()))
                .cloned()
                .ok_or_else(|| ConfigError::key_not_found(key, namespace))
        }
    }

    #[test]
    fn test_redis_settings_string_port() {
        let source = StaticSource::default().with(
            Namespace::Common,
            REDIS_CONFIG_KEY,
            json!({"host": "redis.internal", "port": "6380"}),
        );

        let settings = RedisSettings::load(&source).unwrap();
        assert_eq!(settings.host, "redis.internal");
        assert_eq!(settings.port, 6380);
        assert_eq!(settings.address(), "redis.internal:6380");
    }

    #[test]
    fn test_redis_settings_numeric_port_and_defaults() {
        let source =
            StaticSource::default().with(Namespace::Common, REDIS_CONFIG_KEY, json!({"port": 7000}));
        let settings = RedisSettings::load(&source).unwrap();
        assert_eq!(settings.host, "localhost");
        assert_eq!(settings.port, 7000);

        let source = StaticSource::default().with(Namespace::Common, REDIS_CONFIG_KEY, json!({}));
        assert_eq!(RedisSettings::load(&source).unwrap().address(), "localhost:6379");
    }

    #[test]
    fn test_redis_settings_rejects_bad_input() {
        let source = StaticSource::default().with(
            Namespace::Common,
            REDIS_CONFIG_KEY,
            json!({"port": "sixty"}),
        );
        assert!(matches!(RedisSettings::load(&source), Err(ConfigError::Decode { .. })));

        let source =
            StaticSource::default().with(Namespace::Common, REDIS_CONFIG_KEY, json!({"port": 70000}));
        assert!(matches!(RedisSettings::load(&source), Err(ConfigError::Decode { .. })));

        let source =
            StaticSource::default().with(Namespace::Common, REDIS_CONFIG_KEY, json!("redis:6379"));
        assert!(matches!(RedisSettings::load(&source), Err(ConfigError::Decode { .. })));

        let err = RedisSettings::load(&StaticSource::default()).unwrap_err();
        assert!(err.is_key_not_found());
    }

    #[test]
    fn test_database_settings() {
        let source = StaticSource::default().with(
            Namespace::Service,
            DB_CONFIG_KEY,
            json!({"url": "mysql://db:3306/orders", "maxPoolSize": 20}),
        );
        let settings = DatabaseSettings::load(&source).unwrap();
        assert_eq!(settings.url, "mysql://db:3306/orders");
        assert_eq!(settings.max_pool_size, 20);

        let source = StaticSource::default().with(
            Namespace::Service,
            DB_CONFIG_KEY,
            json!({"url": "mysql://db", "maxPoolSize": "8"}),
        );
        assert_eq!(DatabaseSettings::load(&source).unwrap().max_pool_size, 8);
    }

    #[test]
    fn test_database_settings_checks_every_field() {
        for doc in [
            json!({"maxPoolSize": 5}),
            json!({"url": 42, "maxPoolSize": 5}),
            json!({"url": "mysql://db"}),
            json!({"url": "mysql://db", "maxPoolSize": 0}),
            json!({"url": "mysql://db", "maxPoolSize": -3}),
            json!({"url": "mysql://db", "maxPoolSize": [5]}),
            json!(["url"]),
        ] {
            let source = StaticSource::default().with(Namespace::Service, DB_CONFIG_KEY, doc);
            assert!(
                matches!(DatabaseSettings::load(&source), Err(ConfigError::Decode { .. })),
                "expected decode error"
            );
        }
    }

    #[test]
    fn test_auth_service_url() {
        let source = StaticSource::default().with(
            Namespace::Common,
            AUTH_SERVICE_URL_KEY,
            json!("http://auth:8080"),
        );
        assert_eq!(auth_service_url(&source).unwrap(), "http://auth:8080");

        let source = StaticSource::default().with(Namespace::Common, AUTH_SERVICE_URL_KEY, json!(1));
        assert!(matches!(auth_service_url(&source), Err(ConfigError::TypeMismatch { .. })));
    }
}
