//! cache_keys tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::existing_store;
use crate::tools::json_result;
use crate::worker::ServiceWorker;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// Store whose request keys to list. When omitted, lists store names.
    #[serde(default)]
    pub cache_name: Option<String>,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CacheKeysOutput {
    Stores { stores: Vec<String> },
    Requests { cache_name: String, requests: Vec<String> },
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(worker: &ServiceWorker, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let output = match params.cache_name.as_deref() {
        None => CacheKeysOutput::Stores { stores: worker.storage().keys().await? },
        Some(name) => {
            let store = existing_store(worker, Some(name)).await?;
            let requests = store.keys().await?.iter().map(ToString::to_string).collect();
            CacheKeysOutput::Requests { cache_name: store.name().to_string(), requests }
        }
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::output_text;
    use crate::worker::testing::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_keys_lists_stores() {
        let worker = worker(Arc::new(manifest_network())).await;
        worker.storage().open("pwa-cache-v0").await.unwrap();
        worker.install().await.unwrap();

        let result = keys_impl(&worker, CacheKeysParams::default()).await.unwrap();
        let output: serde_json::Value = serde_json::from_str(&output_text(&result)).unwrap();
        assert_eq!(output["stores"], serde_json::json!(["pwa-cache-v0", "pwa-cache-v1"]));
    }

    #[tokio::test]
    async fn test_keys_lists_requests_in_manifest_order() {
        let worker = worker(Arc::new(manifest_network())).await;
        worker.install().await.unwrap();

        let params = CacheKeysParams { cache_name: Some("pwa-cache-v1".into()) };
        let result = keys_impl(&worker, params).await.unwrap();
        let output: serde_json::Value = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(
            output["requests"],
            serde_json::json!([
                "GET http://localhost:8000/",
                "GET http://localhost:8000/static/app.js",
                "GET http://localhost:8000/static/manifest.json",
            ])
        );
    }

    #[tokio::test]
    async fn test_keys_unknown_store() {
        let worker = worker(Arc::new(manifest_network())).await;
        let params = CacheKeysParams { cache_name: Some("nope".into()) };
        let err = keys_impl(&worker, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }
}
