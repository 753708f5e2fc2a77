//! Configuration client error types using thiserror 2.0.
//!
//! Construction-time failures (`Configuration`, `Connection`,
//! `Initialization`) are fatal to the client. Lookup failures are returned to
//! the caller. Refresh failures never leave the client; they are logged.

use crate::cache::Namespace;
use rust_common::PlatformError;
use thiserror::Error;

/// Errors reported by a coordination-service transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// No node exists at the path
    #[error("node {0} does not exist")]
    NoNode(String),

    /// Connection to the ensemble was lost
    #[error("connection lost: {0}")]
    ConnectionLoss(String),

    /// The session expired and must be re-established
    #[error("session expired")]
    SessionExpired,

    /// The operation did not complete in time
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// The session was closed locally
    #[error("session closed")]
    Closed,

    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

impl CoordinatorError {
    /// Whether this is the "node missing" condition.
    #[must_use]
    pub const fn is_no_node(&self) -> bool {
        matches!(self, Self::NoNode(_))
    }

    /// Whether a later attempt may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionLoss(_) | Self::SessionExpired | Self::Timeout(_)
        )
    }
}

/// Configuration client errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration input is missing or invalid
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A session with the coordination service could not be established
    #[error("Failed to connect to coordination service: {0}")]
    Connection(String),

    /// The initial configuration load failed
    #[error("Failed to load initial configurations: {0}")]
    Initialization(String),

    /// A document could not be decoded
    #[error("Failed to decode {namespace} config: {reason}")]
    Decode {
        /// Namespace the document belongs to
        namespace: Namespace,
        /// Decoder message
        reason: String,
    },

    /// Key absent from the selected namespace
    #[error("key {key} not found in {namespace} configuration")]
    KeyNotFound {
        /// Requested key
        key: String,
        /// Namespace that was searched
        namespace: Namespace,
    },

    /// Value has a different shape than requested
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Requested type
        expected: &'static str,
        /// Actual type
        found: &'static str,
    },

    /// Raw node lookup hit a missing node
    #[error("node {0} does not exist")]
    NodeNotFound(String),

    /// Coordination-service failure
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    /// Client has been closed
    #[error("configuration client is closed")]
    Closed,

    /// Platform error
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Check if error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Coordinator(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Whether this is an ordinary configuration miss rather than an
    /// infrastructure failure.
    #[must_use]
    pub const fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(namespace: Namespace, reason: impl Into<String>) -> Self {
        Self::Decode {
            namespace,
            reason: reason.into(),
        }
    }

    /// Create a key not found error.
    #[must_use]
    pub fn key_not_found(key: impl Into<String>, namespace: Namespace) -> Self {
        Self::KeyNotFound {
            key: key.into(),
            namespace,
        }
    }
}
