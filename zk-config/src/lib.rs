//! ZooKeeper-backed configuration cache for market-mosaic services.
//!
//! A [`ConfigClient`] connects to the coordination service, loads the
//! service document (`/config/{service}/config-properties`) and the optional
//! common document (`/config/application/{common-lib}`), and refreshes both
//! in the background. Lookups never touch the network. [`ConfigManagerCell`]
//! builds one shared [`ConfigManager`] per process.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod manager;
pub mod settings;
pub mod value;
#[cfg(feature = "zookeeper")]
pub mod zookeeper;

pub use cache::{ConfigCache, Document, Namespace};
pub use client::ConfigClient;
pub use config::ClientConfig;
pub use coordinator::{Connector, Coordinator};
pub use error::{ConfigError, ConfigResult, CoordinatorError};
pub use manager::{ConfigManager, ConfigManagerCell};
pub use settings::{ConfigSource, DatabaseSettings, RedisSettings, auth_service_url};
pub use value::ConfigValue;
#[cfg(feature = "zookeeper")]
pub use zookeeper::{ZooKeeperConnector, ZooKeeperCoordinator};
