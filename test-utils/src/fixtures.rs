//! Test fixtures with sample data.
//!
//! This module provides pre-built documents and configurations for use in
//! tests.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use std::time::Duration;
use zk_config::ClientConfig;

/// Service name used by the fixtures.
pub const SERVICE_NAME: &str = "order-service";
/// Common library name used by the fixtures.
pub const COMMON_LIB_NAME: &str = "market-common";
/// Path of the fixture service document.
pub const SERVICE_PATH: &str = "/config/order-service/config-properties";
/// Path of the fixture common document.
pub const COMMON_PATH: &str = "/config/application/market-common";

/// Encode a JSON document in the node wire format (base64 of the JSON text).
#[must_use]
pub fn encode_document(document: &serde_json::Value) -> Vec<u8> {
    STANDARD.encode(document.to_string()).into_bytes()
}

/// Sample service document.
#[must_use]
pub fn service_document() -> serde_json::Value {
    json!({
        "DB_CONFIG": {"url": "mysql://db.internal:3306/orders", "maxPoolSize": 20},
        "ORDER_TIMEOUT_SECS": 45,
        "FEATURE_BULK_ORDERS": true,
        "GREETING": "hello"
    })
}

/// Sample common document.
#[must_use]
pub fn common_document() -> serde_json::Value {
    json!({
        "REDIS_CONFIG": {"host": "redis.internal", "port": "6379"},
        "REDIS_PORT": 6379,
        "AUTH_SERV_URL": "http://auth-service:8080",
        "ALLOWED_ORIGINS": ["https://a.example.com", "https://b.example.com"]
    })
}

/// Client configuration pointing at the fixture paths, with the common
/// library enabled and a 30 second refresh interval.
#[must_use]
pub fn client_config() -> ClientConfig {
    ClientConfig::new(vec!["zk.test:2181".to_string()], SERVICE_NAME)
        .with_common_lib_name(COMMON_LIB_NAME)
        .with_refresh_interval(Duration::from_secs(30))
}
