//! In-memory store for the service and common configuration documents.

use crate::error::{ConfigError, ConfigResult};
use crate::value::ConfigValue;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Decoded contents of one configuration node.
pub type Document = HashMap<String, ConfigValue>;

/// Configuration scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Per-microservice configuration
    Service,
    /// Configuration shared by every service using the common library
    Common,
}

impl Namespace {
    /// Map the `is_common` flag used by callers of the accessors.
    #[must_use]
    pub const fn from_common_flag(is_common: bool) -> Self {
        if is_common { Self::Common } else { Self::Service }
    }

    /// Name as it appears in logs and errors.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Common => "common",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode raw node bytes: base64 text wrapping a JSON object.
///
/// Line breaks in the base64 text are skipped, so wrapped output from
/// command-line encoders is accepted.
///
/// # Errors
///
/// Returns [`ConfigError::Decode`] if either layer is malformed.
pub fn decode_document(namespace: Namespace, raw: &[u8]) -> ConfigResult<Document> {
    let text: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| !matches!(b, b'\r' | b'\n'))
        .collect();

    let decoded = STANDARD
        .decode(&text)
        .map_err(|e| ConfigError::decode(namespace, format!("invalid base64: {e}")))?;

    serde_json::from_slice(&decoded)
        .map_err(|e| ConfigError::decode(namespace, format!("invalid JSON object: {e}")))
}

/// Last-known-good documents for both namespaces.
///
/// Each document sits behind its own lock as an immutable `Arc`; an update
/// swaps the whole `Arc`, so readers see either the old or the new document
/// and never a mix.
#[derive(Debug, Default)]
pub struct ConfigCache {
    service: RwLock<Arc<Document>>,
    common: RwLock<Arc<Document>>,
}

impl ConfigCache {
    /// Create a cache with two empty documents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn slot(&self, namespace: Namespace) -> &RwLock<Arc<Document>> {
        match namespace {
            Namespace::Service => &self.service,
            Namespace::Common => &self.common,
        }
    }

    /// Decode `raw` and replace the namespace's document.
    ///
    /// A malformed payload is logged and leaves the current document in
    /// place. Returns whether the document was replaced.
    pub fn update_document(&self, namespace: Namespace, raw: &[u8]) -> bool {
        match decode_document(namespace, raw) {
            Ok(document) => {
                debug!(%namespace, keys = document.len(), "Replacing config document");
                self.replace(namespace, document);
                true
            }
            Err(e) => {
                warn!(%namespace, error = %e, "Ignoring undecodable config document");
                false
            }
        }
    }

    /// Replace a namespace's document wholesale.
    pub fn replace(&self, namespace: Namespace, document: Document) {
        let document = Arc::new(document);
        *self.slot(namespace).write() = document;
    }

    /// Look up a key. Never performs I/O.
    #[must_use]
    pub fn get(&self, namespace: Namespace, key: &str) -> Option<ConfigValue> {
        self.slot(namespace).read().get(key).cloned()
    }

    /// The namespace's current document as one consistent snapshot.
    #[must_use]
    pub fn snapshot(&self, namespace: Namespace) -> Arc<Document> {
        Arc::clone(&self.slot(namespace).read())
    }

    /// Whether the namespace currently holds no keys.
    #[must_use]
    pub fn is_empty(&self, namespace: Namespace) -> bool {
        self.slot(namespace).read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> Vec<u8> {
        STANDARD.encode(json).into_bytes()
    }

    #[test]
    fn test_round_trip() {
        let cache = ConfigCache::new();
        assert!(cache.update_document(Namespace::Service, &encode(r#"{"a":"b"}"#)));
        assert_eq!(cache.get(Namespace::Service, "a"), Some(ConfigValue::from("b")));
    }

    #[test]
    fn test_namespaces_are_independent() {
        let cache = ConfigCache::new();
        cache.update_document(Namespace::Common, &encode(r#"{"a":1}"#));

        assert_eq!(cache.get(Namespace::Common, "a"), Some(ConfigValue::from(1)));
        assert_eq!(cache.get(Namespace::Service, "a"), None);
        assert!(cache.is_empty(Namespace::Service));
    }

    #[test]
    fn test_missing_key() {
        let cache = ConfigCache::new();
        cache.update_document(Namespace::Service, &encode(r#"{"a":"b"}"#));
        assert_eq!(cache.get(Namespace::Service, "nonexistent"), None);
    }

    #[test]
    fn test_invalid_base64_keeps_previous_document() {
        let cache = ConfigCache::new();
        cache.update_document(Namespace::Service, &encode(r#"{"a":"b"}"#));

        assert!(!cache.update_document(Namespace::Service, b"not base64!!"));
        assert_eq!(cache.get(Namespace::Service, "a"), Some(ConfigValue::from("b")));
    }

    #[test]
    fn test_invalid_json_keeps_previous_document() {
        let cache = ConfigCache::new();
        cache.update_document(Namespace::Service, &encode(r#"{"a":"b"}"#));

        assert!(!cache.update_document(Namespace::Service, &encode("{not json")));
        assert!(!cache.update_document(Namespace::Service, &encode("[1,2,3]")));
        assert_eq!(cache.get(Namespace::Service, "a"), Some(ConfigValue::from("b")));
    }

    #[test]
    fn test_update_replaces_whole_document() {
        let cache = ConfigCache::new();
        cache.update_document(Namespace::Service, &encode(r#"{"a":1,"b":2}"#));
        cache.update_document(Namespace::Service, &encode(r#"{"c":3}"#));

        assert_eq!(cache.get(Namespace::Service, "a"), None);
        assert_eq!(cache.get(Namespace::Service, "c"), Some(ConfigValue::from(3)));
    }

    #[test]
    fn test_snapshot_is_stable_across_updates() {
        let cache = ConfigCache::new();
        cache.update_document(Namespace::Service, &encode(r#"{"v":1}"#));
        let before = cache.snapshot(Namespace::Service);

        cache.update_document(Namespace::Service, &encode(r#"{"v":2}"#));

        assert_eq!(before.get("v"), Some(&ConfigValue::from(1)));
        assert_eq!(
            cache.snapshot(Namespace::Service).get("v"),
            Some(&ConfigValue::from(2))
        );
    }

    #[test]
    fn test_trailing_newline_is_accepted() {
        let cache = ConfigCache::new();
        let mut raw = encode(r#"{"a":"b"}"#);
        raw.extend_from_slice(b"\r\n");

        assert!(cache.update_document(Namespace::Service, &raw));
        assert_eq!(cache.get(Namespace::Service, "a"), Some(ConfigValue::from("b")));
    }

    #[test]
    fn test_wrapped_payload_is_accepted() {
        let json = format!(r#"{{"DB_URL":"{}","POOL":8}}"#, "x".repeat(120));
        let wrapped: Vec<u8> = encode(&json)
            .chunks(76)
            .flat_map(|line| line.iter().copied().chain(std::iter::once(b'\n')))
            .collect();
        assert!(wrapped.len() > 152);

        let cache = ConfigCache::new();
        assert!(cache.update_document(Namespace::Common, &wrapped));
        assert_eq!(cache.get(Namespace::Common, "POOL"), Some(ConfigValue::from(8)));
        assert_eq!(
            cache.get(Namespace::Common, "DB_URL"),
            Some(ConfigValue::from("x".repeat(120)))
        );
    }

    #[test]
    fn test_other_whitespace_is_rejected() {
        let cache = ConfigCache::new();
        let mut raw = encode(r#"{"a":"b"}"#);
        raw.insert(4, b' ');
        assert!(!cache.update_document(Namespace::Service, &raw));
    }

    #[test]
    fn test_decode_error_names_namespace() {
        let err = decode_document(Namespace::Common, b"%%%").unwrap_err();
        assert!(matches!(err, ConfigError::Decode { namespace: Namespace::Common, .. }));
    }
}
