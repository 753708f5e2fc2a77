//! Configuration client: loads documents from the coordination service and
//! keeps them fresh in the background.

use crate::{
    cache::{ConfigCache, Document, Namespace},
    config::ClientConfig,
    coordinator::{Connector, Coordinator},
    error::{ConfigError, ConfigResult, CoordinatorError},
    value::ConfigValue,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, RwLockReadGuard, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

/// State shared between the client and its refresh task.
struct ConfigLoader {
    coordinator: Arc<dyn Coordinator>,
    cache: ConfigCache,
    service_path: String,
    common_path: Option<String>,
    fetch_timeout: Duration,
}

impl ConfigLoader {
    /// Load both documents. A missing node or an undecodable payload leaves
    /// that namespace untouched; any other fetch failure aborts the load.
    async fn load_configurations(&self) -> ConfigResult<()> {
        self.load_namespace(Namespace::Service, &self.service_path)
            .await?;

        if let Some(path) = &self.common_path {
            self.load_namespace(Namespace::Common, path).await?;
        }

        Ok(())
    }

    async fn load_namespace(&self, namespace: Namespace, path: &str) -> ConfigResult<()> {
        match self.fetch(path).await {
            Ok(data) => {
                self.cache.update_document(namespace, &data);
                Ok(())
            }
            Err(CoordinatorError::NoNode(_)) => {
                debug!(%namespace, path, "Config node missing; keeping current document");
                Ok(())
            }
            Err(e) => Err(ConfigError::Coordinator(e)),
        }
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>, CoordinatorError> {
        tokio::time::timeout(self.fetch_timeout, self.coordinator.get(path))
            .await
            .map_err(|_| CoordinatorError::Timeout(path.to_string()))?
    }
}

/// Client owning one coordination-service session, one cache and one
/// background refresh task.
pub struct ConfigClient {
    config: ClientConfig,
    loader: Arc<ConfigLoader>,
    shutdown_tx: watch::Sender<bool>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    /// Held shared by caller-driven fetches and exclusively by `close`.
    in_flight: RwLock<()>,
}

impl ConfigClient {
    /// Build a client from the process environment.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`] and [`ConfigClient::connect`].
    pub async fn from_env<C>(connector: &C) -> ConfigResult<Self>
    where
        C: Connector + ?Sized,
    {
        Self::connect(ClientConfig::from_env()?, connector).await
    }

    /// Connect, perform the initial load and start the refresh task.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Configuration`] if `config` is invalid
    /// - [`ConfigError::Connection`] if no session could be established
    /// - [`ConfigError::Initialization`] if the initial load failed for a
    ///   reason other than a missing node
    #[instrument(skip_all, fields(service = %config.service_name))]
    pub async fn connect<C>(config: ClientConfig, connector: &C) -> ConfigResult<Self>
    where
        C: Connector + ?Sized,
    {
        config.validate()?;

        let coordinator =
            tokio::time::timeout(config.connection_timeout, connector.connect(&config))
                .await
                .map_err(|_| {
                    ConfigError::connection(format!(
                        "timed out after {}s connecting to {}",
                        config.connection_timeout.as_secs(),
                        config.connect_string()
                    ))
                })?
                .map_err(|e| ConfigError::connection(e.to_string()))?;

        info!(hosts = %config.connect_string(), "Connected to coordination service");

        let loader = Arc::new(ConfigLoader {
            coordinator,
            cache: ConfigCache::new(),
            service_path: config.service_path(),
            common_path: config.common_path(),
            fetch_timeout: config.session_timeout,
        });

        if let Err(e) = loader.load_configurations().await {
            error!(error = %e, "Initial configuration load failed");
            loader.coordinator.close().await;
            return Err(ConfigError::Initialization(e.to_string()));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let refresh_task = tokio::spawn(run_refresh_loop(
            Arc::clone(&loader),
            config.refresh_interval,
            shutdown_rx,
        ));

        info!(
            refresh_secs = config.refresh_interval.as_secs(),
            common = config.common_path().is_some(),
            "Configuration client ready"
        );

        Ok(Self {
            config,
            loader,
            shutdown_tx,
            refresh_task: Mutex::new(Some(refresh_task)),
            closed: AtomicBool::new(false),
            in_flight: RwLock::new(()),
        })
    }

    /// Settings this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying cache.
    #[must_use]
    pub fn cache(&self) -> &ConfigCache {
        &self.loader.cache
    }

    /// Look up `key` and render it as a string. Strings are returned as-is;
    /// other values use their [`Display`](std::fmt::Display) rendering.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KeyNotFound`] if the key is absent.
    pub fn get_string_value_by_key(&self, key: &str, namespace: Namespace) -> ConfigResult<String> {
        match self.get_config_value_by_key(key, namespace)? {
            ConfigValue::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }

    /// Look up `key` and return the decoded value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KeyNotFound`] if the key is absent.
    pub fn get_config_value_by_key(
        &self,
        key: &str,
        namespace: Namespace,
    ) -> ConfigResult<ConfigValue> {
        self.loader
            .cache
            .get(namespace, key)
            .ok_or_else(|| ConfigError::key_not_found(key, namespace))
    }

    /// The namespace's current document as one consistent snapshot.
    #[must_use]
    pub fn snapshot(&self, namespace: Namespace) -> Arc<Document> {
        self.loader.cache.snapshot(namespace)
    }

    /// Reload both documents now. Failures are logged; the cache keeps its
    /// last good contents.
    #[instrument(skip(self), fields(service = %self.config.service_name))]
    pub async fn refresh_data(&self) {
        let Ok(_guard) = self.open_guard().await else {
            warn!("Refresh requested on a closed configuration client");
            return;
        };

        info!("Manual config refresh triggered");
        if let Err(e) = self.loader.load_configurations().await {
            error!(error = %e, "Failed to refresh configurations");
        }
    }

    /// Read a node's raw data.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NodeNotFound`] for a missing node,
    /// [`ConfigError::Closed`] after [`close`](Self::close) and
    /// [`ConfigError::Coordinator`] for any other failure.
    pub async fn get_node(&self, path: &str) -> ConfigResult<Vec<u8>> {
        let _guard = self.open_guard().await?;
        self.loader.fetch(path).await.map_err(|e| node_error(path, e))
    }

    /// List a node's children.
    ///
    /// # Errors
    ///
    /// Same as [`get_node`](Self::get_node).
    pub async fn get_children(&self, path: &str) -> ConfigResult<Vec<String>> {
        let _guard = self.open_guard().await?;
        self.loader
            .coordinator
            .children(path)
            .await
            .map_err(|e| node_error(path, e))
    }

    /// Check whether a node exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Closed`] after [`close`](Self::close) and
    /// [`ConfigError::Coordinator`] if the check itself fails.
    pub async fn exists(&self, path: &str) -> ConfigResult<bool> {
        let _guard = self.open_guard().await?;
        Ok(self.loader.coordinator.exists(path).await?)
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stop the refresh task and close the session.
    ///
    /// Waits for in-flight refreshes and node reads to finish, scheduled or
    /// caller-driven, so no fetch happens once this returns. Calling it again
    /// is a no-op.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!("Configuration client already closed");
            return;
        }

        self.shutdown_tx.send_replace(true);
        let _drained = self.in_flight.write().await;

        let task = self.refresh_task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Config refresh task ended abnormally");
            }
        }

        self.loader.coordinator.close().await;
        info!(service = %self.config.service_name, "Configuration client closed");
    }

    /// Register a caller-driven fetch. The closed flag is checked under the
    /// guard so `close` cannot slip in between the check and the fetch.
    async fn open_guard(&self) -> ConfigResult<RwLockReadGuard<'_, ()>> {
        let guard = self.in_flight.read().await;
        if self.is_closed() {
            Err(ConfigError::Closed)
        } else {
            Ok(guard)
        }
    }
}

impl fmt::Debug for ConfigClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigClient")
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn node_error(path: &str, e: CoordinatorError) -> ConfigError {
    match e {
        CoordinatorError::NoNode(_) => ConfigError::NodeNotFound(path.to_string()),
        other => ConfigError::Coordinator(other),
    }
}

/// Reload on every tick until shutdown is signalled or the client is
/// dropped. The shutdown branch is polled first, so a stopping client never
/// starts another load.
async fn run_refresh_loop(
    loader: Arc<ConfigLoader>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                if let Err(e) = loader.load_configurations().await {
                    error!(error = %e, "Failed to refresh configurations");
                }
            }
        }
    }

    debug!("Config refresh task stopped");
}
