//! SQLite-backed named cache stores.
//!
//! This module provides persistent stores mapping request identities to
//! responses, with async access via tokio-rusqlite. It supports:
//!
//! - Multiple named stores in one database (one per cache version)
//! - Request keys derived from method and canonical URL using SHA-256
//! - Transactional bulk writes so a batch is committed whole or not at all
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod entry;
pub mod hash;
pub mod migrations;
pub mod storage;
pub mod store;

pub use crate::Error;

pub use connection::CacheStorage;
pub use entry::{AssetRequest, AssetResponse};
pub use storage::store_name;
pub use store::Store;
