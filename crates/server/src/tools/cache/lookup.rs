//! cache_match tool implementation.
//!
//! Looks up a stored response by request identity.

use pwa_cache_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::existing_store;
use crate::tools::{ResponseView, json_result};
use crate::worker::ServiceWorker;

/// Parameters for the cache_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchParams {
    /// Path relative to the origin or an absolute URL.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Option<String>,

    /// Store to search (default: the worker's store).
    #[serde(default)]
    pub cache_name: Option<String>,
}

/// Output from the cache_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchOutput {
    pub cache_name: String,
    pub request: String,
    pub response: ResponseView,
}

/// Implementation of the cache_match tool.
pub async fn match_impl(worker: &ServiceWorker, params: CacheMatchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let request = worker.request_for(params.method.as_deref(), &params.url)?;
    let store = existing_store(worker, params.cache_name.as_deref()).await?;
    let response = store
        .match_request(&request)
        .await?
        .ok_or_else(|| Error::CacheMiss(request.to_string()))?;

    json_result(&CacheMatchOutput {
        cache_name: store.name().to_string(),
        request: request.to_string(),
        response: ResponseView::from(&response),
    })
}
