//! Coordination-service abstraction.
//!
//! The configuration client only needs hierarchical reads. Transports
//! implement [`Coordinator`]; a [`Connector`] establishes the session.

use crate::config::ClientConfig;
use crate::error::CoordinatorError;
use async_trait::async_trait;
use std::sync::Arc;

/// Session with a coordination service.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Read a node's data. A missing node yields [`CoordinatorError::NoNode`].
    async fn get(&self, path: &str) -> Result<Vec<u8>, CoordinatorError>;

    /// List the names of a node's children.
    async fn children(&self, path: &str) -> Result<Vec<String>, CoordinatorError>;

    /// Check whether a node exists.
    async fn exists(&self, path: &str) -> Result<bool, CoordinatorError>;

    /// Close the session. Closing twice is a no-op.
    async fn close(&self);
}

/// Establishes coordination-service sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a session using the endpoints and timeouts in `config`.
    async fn connect(&self, config: &ClientConfig)
    -> Result<Arc<dyn Coordinator>, CoordinatorError>;
}

#[async_trait]
impl<T: Connector + ?Sized> Connector for Arc<T> {
    async fn connect(
        &self,
        config: &ClientConfig,
    ) -> Result<Arc<dyn Coordinator>, CoordinatorError> {
        (**self).connect(config).await
    }
}
