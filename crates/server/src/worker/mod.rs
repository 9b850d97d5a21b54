//! The offline asset cache worker.
//!
//! ### Install
//! - Opens (or creates) the named store
//! - Fetches every manifest asset concurrently and checks each status
//!   against the install policy
//! - Commits all responses in one transaction, or nothing if any asset failed
//!
//! ### Handle Fetch
//! - Cache-first: a stored response is returned without touching the network
//! - On a miss, exactly one network fetch whose result is returned unchanged
//! - Misses are never written back to the store
//! - Until the worker is active every request passes straight to the network

pub mod manifest;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use pwa_cache_client::{Network, resolve};
use pwa_cache_core::{AppConfig, AssetRequest, AssetResponse, CacheStorage, Error, StatusPolicy, store_name};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinSet;
use url::Url;

pub use manifest::AssetManifest;
pub use state::WorkerState;

/// Worker settings fixed at registration.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub cache_name: String,
    pub status_policy: StatusPolicy,
    pub install_concurrency: usize,
    pub purge_stale_caches: bool,
}

impl From<&AppConfig> for WorkerOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            cache_name: config.cache_name.clone(),
            status_policy: config.install_status_policy,
            install_concurrency: config.install_concurrency,
            purge_stale_caches: config.purge_stale_caches,
        }
    }
}

/// Where a fetch outcome came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FetchSource {
    Cache,
    Network,
}

/// Response handed back for an intercepted request.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub response: AssetResponse,
    pub source: FetchSource,
}

/// Result of a successful install.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub cache_name: String,
    pub stored: usize,
}

/// Result of a successful activation.
#[derive(Debug, Clone)]
pub struct ActivateReport {
    pub cache_name: String,
    /// Other named stores deleted on activation.
    pub purged: Vec<String>,
}

/// Offline asset cache worker.
///
/// Built once at startup. Everything but the lifecycle state is fixed at
/// construction.
pub struct ServiceWorker {
    storage: CacheStorage,
    network: Arc<dyn Network>,
    origin: Url,
    manifest: AssetManifest,
    options: WorkerOptions,
    state: RwLock<WorkerState>,
}

impl ServiceWorker {
    /// Create a worker in the `Uninstalled` state.
    pub fn new(
        storage: CacheStorage, network: Arc<dyn Network>, origin: Url, manifest: &[String], mut options: WorkerOptions,
    ) -> Result<Self, Error> {
        options.cache_name = store_name(&options.cache_name)?;
        if options.install_concurrency == 0 {
            return Err(Error::InvalidInput("install_concurrency must be at least 1".into()));
        }
        let manifest = AssetManifest::resolve(&origin, manifest)?;
        if manifest.is_empty() {
            return Err(Error::InvalidInput("manifest must list at least one asset".into()));
        }
        Ok(Self { storage, network, origin, manifest, options, state: RwLock::new(WorkerState::Uninstalled) })
    }

    /// Create a worker from loaded configuration.
    pub fn register(config: &AppConfig, storage: CacheStorage, network: Arc<dyn Network>) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidInput(e.to_string()))?;
        Self::new(storage, network, origin, &config.manifest, WorkerOptions::from(config))
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    pub fn cache_name(&self) -> &str {
        &self.options.cache_name
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub fn status_policy(&self) -> StatusPolicy {
        self.options.status_policy
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// Build the request identity for `target`, a path or absolute URL.
    pub fn request_for(&self, method: Option<&str>, target: &str) -> Result<AssetRequest, Error> {
        let url = resolve(&self.origin, target).map_err(|e| Error::InvalidUrl(format!("{target}: {e}")))?;
        Ok(AssetRequest::new(method.unwrap_or("GET"), url))
    }

    /// Pre-cache the manifest as one unit of work.
    ///
    /// On success the worker is `Installed`; on any failure it is back to
    /// `Uninstalled` and nothing was committed to the store.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        {
            let mut state = self.state.write().await;
            *state = state.begin_install()?;
        }
        tracing::info!(cache = %self.options.cache_name, assets = self.manifest.len(), "installing");

        let result = self.precache().await;

        let mut state = self.state.write().await;
        *state = state.finish_install(result.is_ok());
        match &result {
            Ok(report) => tracing::info!(cache = %report.cache_name, stored = report.stored, "installed"),
            Err(e) => tracing::warn!(cache = %self.options.cache_name, error = %e, "install failed"),
        }
        result
    }

    async fn precache(&self) -> Result<InstallReport, Error> {
        let store = self.storage.open(&self.options.cache_name).await?;
        let policy = self.options.status_policy;
        let semaphore = Arc::new(Semaphore::new(self.options.install_concurrency));
        let mut join_set = JoinSet::new();

        for (index, request) in self.manifest.requests().iter().cloned().enumerate() {
            let network = Arc::clone(&self.network);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => network.fetch(&request).await,
                    Err(e) => Err(Error::InstallFailed(e.to_string())),
                };
                (index, request, result)
            });
        }

        let mut fetched = Vec::with_capacity(self.manifest.len());
        while let Some(joined) = join_set.join_next().await {
            let (index, request, result) =
                joined.map_err(|e| Error::InstallFailed(format!("fetch task failed: {e}")))?;

            let failure = match result {
                Ok(response) if policy.accepts(response.status) => {
                    fetched.push((index, request, response));
                    continue;
                }
                Ok(response) => Error::HttpStatus { url: request.url.to_string(), status: response.status },
                Err(e) => e,
            };

            join_set.shutdown().await;
            return Err(Error::InstallFailed(format!("{request}: {failure}")));
        }

        fetched.sort_by_key(|(index, _, _)| *index);
        let entries = fetched.into_iter().map(|(_, request, response)| (request, response)).collect();
        let stored = store.put_all(entries).await?;

        Ok(InstallReport { cache_name: self.options.cache_name.clone(), stored })
    }

    /// Move an installed worker to `Active`.
    ///
    /// With `purge_stale_caches` every other named store is deleted first.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let mut state = self.state.write().await;
        let next = state.activate()?;

        let mut purged = Vec::new();
        if self.options.purge_stale_caches {
            for name in self.storage.keys().await? {
                if name != self.options.cache_name && self.storage.delete(&name).await? {
                    purged.push(name);
                }
            }
        }

        *state = next;
        tracing::info!(cache = %self.options.cache_name, purged = purged.len(), "activated");
        Ok(ActivateReport { cache_name: self.options.cache_name.clone(), purged })
    }

    /// Answer an intercepted request, cache-first.
    pub async fn handle_fetch(&self, request: &AssetRequest) -> Result<FetchOutcome, Error> {
        let state = self.state().await;
        if state == WorkerState::Terminated {
            return Err(Error::InvalidState("worker is terminated".into()));
        }

        if state.serves_from_cache() {
            if let Some(response) = self.lookup(request).await? {
                tracing::debug!(request = %request, "cache hit");
                return Ok(FetchOutcome { response, source: FetchSource::Cache });
            }
            tracing::debug!(request = %request, "cache miss");
        } else {
            tracing::debug!(request = %request, state = %state, "worker not active; passing through");
        }

        let response = self.network.fetch(request).await?;
        Ok(FetchOutcome { response, source: FetchSource::Network })
    }

    /// Stored response for `request`, if the worker's store still exists.
    async fn lookup(&self, request: &AssetRequest) -> Result<Option<AssetResponse>, Error> {
        self.storage.match_in(&self.options.cache_name, request).await
    }

    /// Stop accepting lifecycle events.
    pub async fn terminate(&self) {
        let mut state = self.state.write().await;
        *state = WorkerState::Terminated;
        tracing::info!(cache = %self.options.cache_name, "terminated");
    }
}
