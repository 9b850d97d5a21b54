//! Cache inspection tools.
//!
//! These read and manage the named stores directly, bypassing the worker's
//! lifecycle state.

pub mod delete;
pub mod keys;
pub mod lookup;

pub use delete::{CacheDeleteParams, delete_impl};
pub use keys::{CacheKeysParams, keys_impl};
pub use lookup::{CacheMatchParams, match_impl};

use pwa_cache_core::{Error, Store};

use crate::worker::ServiceWorker;

/// Open `name` (default: the worker's store) without creating it.
async fn existing_store(worker: &ServiceWorker, name: Option<&str>) -> Result<Store, Error> {
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(worker.cache_name());
    let storage = worker.storage();
    if !storage.has(name).await? {
        return Err(Error::CacheMiss(format!("store '{name}' does not exist")));
    }
    storage.handle(name)
}
