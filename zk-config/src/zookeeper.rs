//! ZooKeeper transport backed by `zookeeper-client`.

use crate::{
    config::ClientConfig,
    coordinator::{Connector, Coordinator},
    error::CoordinatorError,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};
use zookeeper_client as zk;

/// Opens ZooKeeper sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZooKeeperConnector;

#[async_trait]
impl Connector for ZooKeeperConnector {
    async fn connect(
        &self,
        config: &ClientConfig,
    ) -> Result<Arc<dyn Coordinator>, CoordinatorError> {
        let cluster = config.connect_string();
        debug!(%cluster, "Connecting to ZooKeeper");

        let mut connector = zk::Client::connector();
        connector
            .session_timeout(config.session_timeout)
            .connection_timeout(config.connection_timeout);
        let client = connector.connect(&cluster).await.map_err(map_error)?;

        info!(%cluster, "ZooKeeper session established");
        Ok(Arc::new(ZooKeeperCoordinator {
            client: RwLock::new(Some(client)),
        }))
    }
}

/// A live ZooKeeper session.
pub struct ZooKeeperCoordinator {
    client: RwLock<Option<zk::Client>>,
}

impl ZooKeeperCoordinator {
    fn session(&self) -> Result<zk::Client, CoordinatorError> {
        self.client.read().clone().ok_or(CoordinatorError::Closed)
    }
}

#[async_trait]
impl Coordinator for ZooKeeperCoordinator {
    async fn get(&self, path: &str) -> Result<Vec<u8>, CoordinatorError> {
        let (data, _stat) = self
            .session()?
            .get_data(path)
            .await
            .map_err(|e| map_path_error(path, e))?;
        Ok(data)
    }

    async fn children(&self, path: &str) -> Result<Vec<String>, CoordinatorError> {
        self.session()?
            .list_children(path)
            .await
            .map_err(|e| map_path_error(path, e))
    }

    async fn exists(&self, path: &str) -> Result<bool, CoordinatorError> {
        let stat = self
            .session()?
            .check_stat(path)
            .await
            .map_err(|e| map_path_error(path, e))?;
        Ok(stat.is_some())
    }

    async fn close(&self) {
        // The session ends when the last handle is dropped.
        if self.client.write().take().is_some() {
            debug!("ZooKeeper session closed");
        }
    }
}

fn map_path_error(path: &str, e: zk::Error) -> CoordinatorError {
    match e {
        zk::Error::NoNode => CoordinatorError::NoNode(path.to_string()),
        other => map_error(other),
    }
}

fn map_error(e: zk::Error) -> CoordinatorError {
    match e {
        zk::Error::ConnectionLoss => CoordinatorError::ConnectionLoss(e.to_string()),
        zk::Error::SessionExpired => CoordinatorError::SessionExpired,
        other => CoordinatorError::Other(other.to_string()),
    }
}
