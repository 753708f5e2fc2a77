//! Shared test utilities for market-mosaic Rust libraries.
//!
//! This crate provides:
//! - An in-memory coordination service with fetch accounting
//! - Proptest generators for configuration documents
//! - Test fixtures with sample documents

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
