//! Worker lifecycle tools.
//!
//! Each tool delivers one lifecycle event through the dispatcher and waits
//! for its deferred result.

use pwa_cache_core::{Error, StatusPolicy};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ResponseView, json_result};
use crate::dispatch::Dispatcher;
use crate::worker::{FetchSource, ServiceWorker, WorkerState};

/// Parameters for the worker_install tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WorkerInstallParams {}

/// Output from the worker_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerInstallOutput {
    pub cache_name: String,
    pub state: WorkerState,
    /// Number of manifest assets committed to the store.
    pub stored: usize,
}

/// Parameters for the worker_activate tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WorkerActivateParams {}

/// Output from the worker_activate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerActivateOutput {
    pub cache_name: String,
    pub state: WorkerState,
    /// Superseded stores deleted during activation.
    pub purged: Vec<String>,
}

/// Parameters for the worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// Path relative to the origin (e.g. "/static/app.js") or an absolute URL.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Option<String>,
}

/// Output from the worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchOutput {
    /// Request identity, e.g. "GET http://localhost:8000/static/app.js".
    pub request: String,
    /// Whether the response came from the store or the network.
    pub source: FetchSource,
    pub response: ResponseView,
}

/// Parameters for the worker_status tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WorkerStatusParams {}

/// Output from the worker_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerStatusOutput {
    pub state: WorkerState,
    pub cache_name: String,
    pub origin: String,
    pub manifest: Vec<String>,
    pub install_status_policy: StatusPolicy,
    /// Entries currently held by the worker's store.
    pub cached_entries: u64,
}

/// Implementation of the worker_install tool.
pub async fn install_impl(
    dispatcher: &Dispatcher, worker: &ServiceWorker, _params: WorkerInstallParams,
) -> Result<CallToolResult, McpError> {
    let report = dispatcher.install().await?;
    json_result(&WorkerInstallOutput {
        cache_name: report.cache_name,
        state: worker.state().await,
        stored: report.stored,
    })
}

/// Implementation of the worker_activate tool.
pub async fn activate_impl(
    dispatcher: &Dispatcher, worker: &ServiceWorker, _params: WorkerActivateParams,
) -> Result<CallToolResult, McpError> {
    let report = dispatcher.activate().await?;
    json_result(&WorkerActivateOutput {
        cache_name: report.cache_name,
        state: worker.state().await,
        purged: report.purged,
    })
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl(
    dispatcher: &Dispatcher, worker: &ServiceWorker, params: WorkerFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let request = worker.request_for(params.method.as_deref(), &params.url)?;
    let label = request.to_string();
    let outcome = dispatcher.fetch(request).await?;

    json_result(&WorkerFetchOutput {
        request: label,
        source: outcome.source,
        response: ResponseView::from(&outcome.response),
    })
}

/// Implementation of the worker_status tool.
pub async fn status_impl(worker: &ServiceWorker, _params: WorkerStatusParams) -> Result<CallToolResult, McpError> {
    let cached_entries = worker.storage().entry_count(worker.cache_name()).await?;

    json_result(&WorkerStatusOutput {
        state: worker.state().await,
        cache_name: worker.cache_name().to_string(),
        origin: worker.origin().to_string(),
        manifest: worker.manifest().paths().to_vec(),
        install_status_policy: worker.status_policy(),
        cached_entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::output_text;
    use crate::worker::testing::*;
    use std::sync::Arc;

    async fn setup(network: MockNetwork) -> (Dispatcher, Arc<ServiceWorker>, Arc<MockNetwork>) {
        let network = Arc::new(network);
        let worker = Arc::new(worker(Arc::clone(&network)).await);
        let (dispatcher, _handle) = Dispatcher::spawn(Arc::clone(&worker));
        (dispatcher, worker, network)
    }

    #[tokio::test]
    async fn test_install_and_activate_tools() {
        let (dispatcher, worker, _network) = setup(manifest_network()).await;

        let result = install_impl(&dispatcher, &worker, WorkerInstallParams::default()).await.unwrap();
        let output: WorkerInstallOutput = serde_json::from_str(&output_text(&result)).unwrap();
        assert_eq!(output.stored, 3);
        assert_eq!(output.state, WorkerState::Installed);

        let result = activate_impl(&dispatcher, &worker, WorkerActivateParams::default()).await.unwrap();
        let output: WorkerActivateOutput = serde_json::from_str(&output_text(&result)).unwrap();
        assert_eq!(output.state, WorkerState::Active);
        assert!(output.purged.is_empty());
    }

    #[tokio::test]
    async fn test_install_tool_failure_code() {
        let (dispatcher, worker, _network) = setup(manifest_network().fail("/")).await;
        let err = install_impl(&dispatcher, &worker, WorkerInstallParams::default()).await.unwrap_err();
        assert_eq!(err.code.0, -32008);
    }

    #[tokio::test]
    async fn test_fetch_tool_reports_source() {
        let (dispatcher, worker, network) = setup(manifest_network()).await;
        dispatcher.install().await.unwrap();
        dispatcher.activate().await.unwrap();

        let params = WorkerFetchParams { url: "/static/manifest.json".into(), method: None };
        let result = fetch_impl(&dispatcher, &worker, params).await.unwrap();
        let output: WorkerFetchOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(output.source, FetchSource::Cache);
        assert_eq!(output.request, "GET http://localhost:8000/static/manifest.json");
        assert_eq!(output.response.body, r#"{"name":"Comics"}"#);
        assert_eq!(network.calls("/static/manifest.json"), 1);
    }

    #[tokio::test]
    async fn test_fetch_tool_empty_url() {
        let (dispatcher, worker, _network) = setup(manifest_network()).await;
        let params = WorkerFetchParams { url: "  ".into(), method: None };
        let err = fetch_impl(&dispatcher, &worker, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_status_tool() {
        let (dispatcher, worker, _network) = setup(manifest_network()).await;

        let result = status_impl(&worker, WorkerStatusParams::default()).await.unwrap();
        let output: WorkerStatusOutput = serde_json::from_str(&output_text(&result)).unwrap();
        assert_eq!(output.state, WorkerState::Uninstalled);
        assert_eq!(output.cached_entries, 0);
        assert_eq!(output.manifest, default_manifest());
        assert_eq!(output.install_status_policy, StatusPolicy::RequireOk);

        dispatcher.install().await.unwrap();
        let result = status_impl(&worker, WorkerStatusParams::default()).await.unwrap();
        let output: WorkerStatusOutput = serde_json::from_str(&output_text(&result)).unwrap();
        assert_eq!(output.state, WorkerState::Installed);
        assert_eq!(output.cached_entries, 3);
        assert_eq!(output.origin, "http://localhost:8000/");
    }
}
