//! Shared library for cross-cutting concerns in market-mosaic Rust services.
//!
//! This crate provides centralized implementations for:
//! - A shared platform error type
//! - Environment variable parsing with defaults
//! - Logger construction on top of `tracing-subscriber`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod tracing_config;

pub use env::{optional_env, parse_env_with, process_env, required_env};
pub use error::{PlatformError, PlatformResult};
pub use tracing_config::{Environment, TracingConfig, init_tracing};
