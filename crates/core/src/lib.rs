//! Core types and shared functionality for pwa-cache.
//!
//! This crate provides:
//! - Named cache stores with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{AssetRequest, AssetResponse, CacheStorage, Store, store_name};
pub use config::{AppConfig, ConfigError, StatusPolicy};
pub use error::Error;
