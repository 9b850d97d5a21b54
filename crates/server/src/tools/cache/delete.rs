//! cache_delete tool implementation.
//!
//! Deletes a named store and all of its entries.

use pwa_cache_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use crate::worker::ServiceWorker;

/// Parameters for the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteParams {
    /// Name of the store to delete.
    pub cache_name: String,
}

/// Output from the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteOutput {
    pub cache_name: String,
    /// False when no store had that name.
    pub deleted: bool,
}

/// Implementation of the cache_delete tool.
pub async fn delete_impl(worker: &ServiceWorker, params: CacheDeleteParams) -> Result<CallToolResult, McpError> {
    let name = params.cache_name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("cache_name cannot be empty".into()).into());
    }

    let deleted = worker.storage().delete(name).await?;
    if deleted && name == worker.cache_name() {
        tracing::warn!(cache = name, "deleted the worker's own store; requests will fall through to the network");
    }

    json_result(&CacheDeleteOutput { cache_name: name.to_string(), deleted })
}
