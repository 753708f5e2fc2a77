//! Mock implementations for testing.
//!
//! [`MockCoordinator`] is an in-memory node tree that records every fetch
//! and can be told to fail specific paths. [`MockConnector`] hands it out and
//! counts connection attempts.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use zk_config::{ClientConfig, Connector, Coordinator, CoordinatorError};

use crate::fixtures::encode_document;

/// In-memory coordination service.
#[derive(Debug, Default)]
pub struct MockCoordinator {
    nodes: RwLock<HashMap<String, Vec<u8>>>,
    failures: RwLock<HashMap<String, CoordinatorError>>,
    fetch_log: RwLock<Vec<String>>,
    fetches: AtomicUsize,
    closes: AtomicUsize,
    closed: AtomicBool,
    fetch_delay_ms: AtomicU64,
}

impl MockCoordinator {
    /// Create an empty coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes at `path`.
    pub async fn set_node(&self, path: &str, data: impl Into<Vec<u8>>) {
        self.nodes.write().await.insert(path.to_string(), data.into());
    }

    /// Store a JSON document at `path` in the base64 wire format.
    pub async fn set_document(&self, path: &str, document: &serde_json::Value) {
        self.set_node(path, encode_document(document)).await;
    }

    /// Delete the node at `path`.
    pub async fn remove_node(&self, path: &str) {
        self.nodes.write().await.remove(path);
    }

    /// Make every operation on `path` fail with `error`.
    pub async fn fail_path(&self, path: &str, error: CoordinatorError) {
        self.failures.write().await.insert(path.to_string(), error);
    }

    /// Stop failing `path`.
    pub async fn clear_failure(&self, path: &str) {
        self.failures.write().await.remove(path);
    }

    /// Make every `get` sleep for `delay` after it has been counted.
    pub fn set_fetch_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.fetch_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Total number of `get` calls.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `get` calls for one path.
    pub async fn fetch_count_for(&self, path: &str) -> usize {
        self.fetch_log
            .read()
            .await
            .iter()
            .filter(|p| p.as_str() == path)
            .count()
    }

    /// Paths fetched so far, in order.
    pub async fn fetched_paths(&self) -> Vec<String> {
        self.fetch_log.read().await.clone()
    }

    /// Whether `close` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of `close` calls.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    async fn check(&self, path: &str) -> Result<(), CoordinatorError> {
        if self.is_closed() {
            return Err(CoordinatorError::Closed);
        }
        match self.failures.read().await.get(path) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Coordinator for MockCoordinator {
    async fn get(&self, path: &str) -> Result<Vec<u8>, CoordinatorError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.fetch_log.write().await.push(path.to_string());

        let delay = self.fetch_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.check(path).await?;

        self.nodes
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| CoordinatorError::NoNode(path.to_string()))
    }

    async fn children(&self, path: &str) -> Result<Vec<String>, CoordinatorError> {
        self.check(path).await?;

        let prefix = format!("{}/", path.trim_end_matches('/'));
        let nodes = self.nodes.read().await;
        let mut children: Vec<String> = nodes
            .keys()
            .filter_map(|p| p.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();

        if children.is_empty() && !nodes.contains_key(path) {
            return Err(CoordinatorError::NoNode(path.to_string()));
        }
        children.sort();
        children.dedup();
        Ok(children)
    }

    async fn exists(&self, path: &str) -> Result<bool, CoordinatorError> {
        self.check(path).await?;

        let prefix = format!("{}/", path.trim_end_matches('/'));
        let nodes = self.nodes.read().await;
        Ok(nodes.contains_key(path) || nodes.keys().any(|p| p.starts_with(&prefix)))
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Connector handing out one shared [`MockCoordinator`].
#[derive(Debug)]
pub struct MockConnector {
    coordinator: Arc<MockCoordinator>,
    connects: AtomicUsize,
    failure: Option<CoordinatorError>,
    delay: Duration,
}

impl MockConnector {
    /// Connector for `coordinator`.
    #[must_use]
    pub const fn new(coordinator: Arc<MockCoordinator>) -> Self {
        Self {
            coordinator,
            connects: AtomicUsize::new(0),
            failure: None,
            delay: Duration::ZERO,
        }
    }

    /// Connector whose every attempt fails with `error`.
    #[must_use]
    pub fn failing(error: CoordinatorError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(Arc::new(MockCoordinator::new()))
        }
    }

    /// Sleep for `delay` before completing each attempt.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The coordinator handed out by this connector.
    #[must_use]
    pub const fn coordinator(&self) -> &Arc<MockCoordinator> {
        &self.coordinator
    }

    /// Number of connection attempts.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        _config: &ClientConfig,
    ) -> Result<Arc<dyn Coordinator>, CoordinatorError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(Arc::clone(&self.coordinator) as Arc<dyn Coordinator>),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_coordinator_nodes() {
        let zk = MockCoordinator::new();
        zk.set_node("/config/a/config-properties", b"abc".to_vec()).await;
        zk.set_node("/config/application/common", b"x".to_vec()).await;

        assert_eq!(zk.get("/config/a/config-properties").await.unwrap(), b"abc");
        assert_eq!(
            zk.get("/config/missing").await.unwrap_err(),
            CoordinatorError::NoNode("/config/missing".to_string())
        );
        assert_eq!(zk.fetch_count(), 2);
        assert_eq!(zk.fetch_count_for("/config/missing").await, 1);

        assert_eq!(zk.children("/config").await.unwrap(), vec!["a", "application"]);
        assert!(zk.exists("/config/application").await.unwrap());
        assert!(!zk.exists("/other").await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_coordinator_failures_and_close() {
        let zk = MockCoordinator::new();
        zk.set_node("/a", b"1".to_vec()).await;
        zk.fail_path("/a", CoordinatorError::SessionExpired).await;
        assert_eq!(zk.get("/a").await.unwrap_err(), CoordinatorError::SessionExpired);

        zk.clear_failure("/a").await;
        assert!(zk.get("/a").await.is_ok());

        zk.close().await;
        zk.close().await;
        assert!(zk.is_closed());
        assert_eq!(zk.close_count(), 2);
        assert_eq!(zk.get("/a").await.unwrap_err(), CoordinatorError::Closed);
    }

    #[tokio::test]
    async fn test_mock_connector() {
        let connector = MockConnector::new(Arc::new(MockCoordinator::new()));
        let config = ClientConfig::new(vec!["zk:2181".into()], "svc");
        assert!(connector.connect(&config).await.is_ok());
        assert_eq!(connector.connect_count(), 1);

        let connector = MockConnector::failing(CoordinatorError::ConnectionLoss("refused".into()));
        assert!(connector.connect(&config).await.is_err());
    }
}
