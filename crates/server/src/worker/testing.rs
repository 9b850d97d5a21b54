//! Test doubles for the network and a ready-made worker.

use super::{ServiceWorker, WorkerOptions};
use bytes::Bytes;
use pwa_cache_client::Network;
use pwa_cache_core::{AssetRequest, AssetResponse, CacheStorage, Error, StatusPolicy};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

pub(crate) const ORIGIN: &str = "http://localhost:8000";

enum Route {
    Respond(AssetResponse),
    Fail,
}

/// In-memory network that counts every call per URL.
///
/// Unknown URLs answer 404.
#[derive(Default)]
pub(crate) struct MockNetwork {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn serve(self, path: &str, status: u16, body: &'static str) -> Self {
        let url = url(path);
        let response = AssetResponse {
            url: url.to_string(),
            status,
            headers: vec![("content-type".into(), "text/plain".into())],
            body: Bytes::from_static(body.as_bytes()),
        };
        self.routes.lock().unwrap().insert(url.to_string(), Route::Respond(response));
        self
    }

    pub(crate) fn fail(self, path: &str) -> Self {
        self.routes.lock().unwrap().insert(url(path).to_string(), Route::Fail);
        self
    }

    pub(crate) fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(url(path).as_str()).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait::async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, Error> {
        let key = request.url.to_string();
        *self.calls.lock().unwrap().entry(key.clone()).or_insert(0) += 1;

        match self.routes.lock().unwrap().get(&key) {
            Some(Route::Respond(response)) => Ok(response.clone()),
            Some(Route::Fail) => Err(Error::Network(format!("{request}: connection refused"))),
            None => Ok(AssetResponse { url: key, status: 404, headers: Vec::new(), body: Bytes::new() }),
        }
    }
}

pub(crate) fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

pub(crate) fn request(path: &str) -> AssetRequest {
    AssetRequest::get(url(path))
}

pub(crate) fn default_manifest() -> Vec<String> {
    vec!["/".into(), "/static/app.js".into(), "/static/manifest.json".into()]
}

/// Network serving every path of the default manifest.
pub(crate) fn manifest_network() -> MockNetwork {
    MockNetwork::new()
        .serve("/", 200, "<html>comics</html>")
        .serve("/static/app.js", 200, "navigator.serviceWorker.register('/service-worker.js');")
        .serve("/static/manifest.json", 200, r#"{"name":"Comics"}"#)
}

pub(crate) fn options() -> WorkerOptions {
    WorkerOptions {
        cache_name: "pwa-cache-v1".into(),
        status_policy: StatusPolicy::RequireOk,
        install_concurrency: 4,
        purge_stale_caches: false,
    }
}

pub(crate) fn worker_with(
    storage: CacheStorage, network: Arc<MockNetwork>, options: WorkerOptions, manifest: &[String],
) -> ServiceWorker {
    let origin = Url::parse(ORIGIN).unwrap();
    ServiceWorker::new(storage, network, origin, manifest, options).unwrap()
}

pub(crate) async fn worker(network: Arc<MockNetwork>) -> ServiceWorker {
    let storage = CacheStorage::open_in_memory().await.unwrap();
    worker_with(storage, network, options(), &default_manifest())
}
