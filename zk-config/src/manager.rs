//! Process-wide configuration handle.
//!
//! [`ConfigManagerCell`] guards construction so the client is built at most
//! once; every caller gets a clone of the same [`ConfigManager`] (or of the
//! same construction error). Applications create one cell at startup and
//! pass it, or the manager it yields, to the components that need
//! configuration.

use crate::{
    cache::{Document, Namespace},
    client::ConfigClient,
    config::ClientConfig,
    coordinator::Connector,
    error::{ConfigError, ConfigResult},
    value::ConfigValue,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::{error, info};

/// Shared handle to the process's configuration client.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    client: Arc<ConfigClient>,
}

impl ConfigManager {
    /// Wrap an already connected client.
    #[must_use]
    pub fn new(client: ConfigClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// The wrapped client.
    #[must_use]
    pub const fn client(&self) -> &Arc<ConfigClient> {
        &self.client
    }

    /// Whether both handles share the same client.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.client, &other.client)
    }

    /// See [`ConfigClient::get_string_value_by_key`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KeyNotFound`](crate::ConfigError::KeyNotFound)
    /// if the key is absent.
    pub fn get_string_value_by_key(&self, key: &str, namespace: Namespace) -> ConfigResult<String> {
        self.client.get_string_value_by_key(key, namespace)
    }

    /// See [`ConfigClient::get_config_value_by_key`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KeyNotFound`](crate::ConfigError::KeyNotFound)
    /// if the key is absent.
    pub fn get_config_value_by_key(
        &self,
        key: &str,
        namespace: Namespace,
    ) -> ConfigResult<ConfigValue> {
        self.client.get_config_value_by_key(key, namespace)
    }

    /// See [`ConfigClient::snapshot`].
    #[must_use]
    pub fn snapshot(&self, namespace: Namespace) -> Arc<Document> {
        self.client.snapshot(namespace)
    }

    /// Reload both documents now.
    pub async fn refresh_data(&self) {
        info!("Manual configuration refresh triggered");
        self.client.refresh_data().await;
    }

    /// Close the wrapped client. Safe to call from several handles.
    pub async fn close(&self) {
        self.client.close().await;
    }
}

/// Single-execution guard around [`ConfigManager`] construction.
///
/// Construction runs on its own task, so a caller that gives up waiting
/// does not abandon the attempt.
pub struct ConfigManagerCell {
    connector: Arc<dyn Connector>,
    config: Option<ClientConfig>,
    started: AtomicBool,
    outcome: watch::Sender<Option<ConfigResult<ConfigManager>>>,
}

impl ConfigManagerCell {
    /// Guard construction from an explicit configuration.
    #[must_use]
    pub fn new(config: ClientConfig, connector: Arc<dyn Connector>) -> Self {
        Self::with_config(Some(config), connector)
    }

    /// Guard construction from the process environment. The environment is
    /// read by the first [`get_or_create`](Self::get_or_create) call.
    #[must_use]
    pub fn from_env(connector: Arc<dyn Connector>) -> Self {
        Self::with_config(None, connector)
    }

    fn with_config(config: Option<ClientConfig>, connector: Arc<dyn Connector>) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            connector,
            config,
            started: AtomicBool::new(false),
            outcome,
        }
    }

    /// Return the manager, building it on first use.
    ///
    /// Concurrent callers wait for the single construction attempt and all
    /// observe its outcome; a failed attempt is not retried. Cancelling a
    /// waiting caller leaves the attempt running for the others.
    ///
    /// # Errors
    ///
    /// Returns the construction error of [`ConfigClient::connect`] (or of
    /// reading the environment) to every caller.
    pub async fn get_or_create(&self) -> ConfigResult<ConfigManager> {
        let mut rx = self.outcome.subscribe();

        if !self.started.swap(true, Ordering::AcqRel) {
            let outcome = self.outcome.clone();
            let config = self.config.clone();
            let connector = Arc::clone(&self.connector);
            tokio::spawn(async move {
                let result = create(config, connector).await;
                if let Err(e) = &result {
                    error!(error = %e, "Configuration manager construction failed");
                }
                outcome.send_replace(Some(result));
            });
        }

        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| ConfigError::Initialization("construction task vanished".to_string()))?;

        (*outcome).clone().unwrap_or_else(|| {
            Err(ConfigError::Initialization("construction produced no outcome".to_string()))
        })
    }

    /// The manager if construction already succeeded.
    #[must_use]
    pub fn get(&self) -> Option<ConfigManager> {
        self.outcome
            .borrow()
            .as_ref()
            .and_then(|result| result.as_ref().ok().cloned())
    }
}

async fn create(
    config: Option<ClientConfig>,
    connector: Arc<dyn Connector>,
) -> ConfigResult<ConfigManager> {
    let config = match config {
        Some(config) => config,
        None => ClientConfig::from_env()?,
    };

    let client = ConfigClient::connect(config, connector.as_ref()).await?;
    Ok(ConfigManager::new(client))
}

impl std::fmt::Debug for ConfigManagerCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManagerCell")
            .field("config", &self.config)
            .field("initialized", &self.outcome.borrow().is_some())
            .finish_non_exhaustive()
    }
}
