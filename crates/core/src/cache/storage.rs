//! Named store management.
//!
//! A store is created the first time it is opened and lives until it is
//! explicitly deleted. Deleting a store drops all of its entries.

use super::connection::CacheStorage;
use super::entry::{AssetRequest, AssetResponse};
use super::store::Store;
use crate::Error;
use tokio_rusqlite::params;

/// Canonical form of a store name. Every lookup goes through this so that
/// `"v1"` and `" v1 "` always name the same store.
pub fn store_name(name: &str) -> Result<String, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("cache name cannot be empty".into()));
    }
    Ok(name.to_string())
}

impl CacheStorage {
    /// Open the store called `name`, creating it if absent.
    pub async fn open(&self, name: &str) -> Result<Store, Error> {
        let name = store_name(name)?;

        let created_at = chrono::Utc::now().to_rfc3339();
        let insert_name = name.clone();
        let created = self
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
                    params![insert_name, created_at],
                )?;
                Ok(inserted > 0)
            })
            .await
            .map_err(Error::from)?;

        if created {
            tracing::info!(cache = %name, "created cache store");
        }

        Ok(Store::new(self.conn.clone(), name))
    }

    /// Whether a store called `name` exists.
    pub async fn has(&self, name: &str) -> Result<bool, Error> {
        let name = store_name(name)?;
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM caches WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete the store called `name` together with all of its entries.
    ///
    /// Returns false if no such store existed.
    pub async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = store_name(name)?;
        let deleted_name = name.clone();
        let deleted = self
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM caches WHERE name = ?1", params![deleted_name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)?;

        if deleted {
            tracing::info!(cache = %name, "deleted cache store");
        }
        Ok(deleted)
    }

    /// Handle to the store called `name` that does not create it.
    ///
    /// Reads through the handle see no entries while the store is absent;
    /// writes create it.
    pub fn handle(&self, name: &str) -> Result<Store, Error> {
        Ok(Store::new(self.conn.clone(), store_name(name)?))
    }

    /// Look up `request` in the store called `name` without creating it.
    ///
    /// A missing store is a miss. This is a single read, so a concurrent
    /// delete can never resurrect the store.
    pub async fn match_in(&self, name: &str, request: &AssetRequest) -> Result<Option<AssetResponse>, Error> {
        self.handle(name)?.match_request(request).await
    }

    /// Number of entries held by the store called `name`; 0 if it is absent.
    pub async fn entry_count(&self, name: &str) -> Result<u64, Error> {
        self.handle(name)?.len().await
    }

    /// Names of all stores, oldest first.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_store() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        assert!(!storage.has("pwa-cache-v1").await.unwrap());

        let store = storage.open("pwa-cache-v1").await.unwrap();
        assert_eq!(store.name(), "pwa-cache-v1");
        assert!(storage.has("pwa-cache-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_open_twice_is_same_store() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        storage.open("pwa-cache-v1").await.unwrap();
        storage.open("pwa-cache-v1").await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["pwa-cache-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_open_empty_name() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let result = storage.open("  ").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_names_are_trimmed_everywhere() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let store = storage.open("pwa-cache-v1 ").await.unwrap();
        assert_eq!(store.name(), "pwa-cache-v1");

        assert!(storage.has("pwa-cache-v1").await.unwrap());
        assert!(storage.has(" pwa-cache-v1 ").await.unwrap());
        assert!(matches!(storage.has("  ").await, Err(Error::InvalidInput(_))));

        assert!(storage.delete("pwa-cache-v1 ").await.unwrap());
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_match_in_never_creates_store() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let request = AssetRequest::get(url::Url::parse("http://localhost:8000/").unwrap());

        assert!(storage.match_in("pwa-cache-v1", &request).await.unwrap().is_none());
        assert_eq!(storage.entry_count("pwa-cache-v1").await.unwrap(), 0);
        assert!(!storage.has("pwa-cache-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_match_in_finds_stored_entry() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let request = AssetRequest::get(url::Url::parse("http://localhost:8000/").unwrap());
        let response = AssetResponse {
            url: request.url.to_string(),
            status: 200,
            headers: Vec::new(),
            body: bytes::Bytes::from_static(b"<html></html>"),
        };
        storage.open("pwa-cache-v1").await.unwrap().put(&request, &response).await.unwrap();

        assert_eq!(storage.match_in(" pwa-cache-v1", &request).await.unwrap(), Some(response));
        assert_eq!(storage.entry_count("pwa-cache-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_store() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        storage.open("pwa-cache-v1").await.unwrap();
        storage.open("pwa-cache-v2").await.unwrap();

        assert!(storage.delete("pwa-cache-v1").await.unwrap());
        assert!(!storage.delete("pwa-cache-v1").await.unwrap());
        assert_eq!(storage.keys().await.unwrap(), vec!["pwa-cache-v2".to_string()]);
    }
}
