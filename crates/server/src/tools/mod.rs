//! MCP tool implementations.
//!
//! This module contains all tools exposed by the pwa-cache server.

pub mod cache;
pub mod worker;

use pwa_cache_core::{AssetResponse, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// One response header.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

/// Response fields shared by every tool that returns a response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseView {
    /// Final URL of the response.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<HeaderPair>,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
    /// Body length in bytes.
    pub body_bytes: usize,
}

impl From<&AssetResponse> for ResponseView {
    fn from(response: &AssetResponse) -> Self {
        Self {
            url: response.url.clone(),
            status: response.status,
            content_type: response.content_type().map(str::to_string),
            headers: response
                .headers
                .iter()
                .map(|(name, value)| HeaderPair { name: name.clone(), value: value.clone() })
                .collect(),
            body: String::from_utf8_lossy(&response.body).into_owned(),
            body_bytes: response.body.len(),
        }
    }
}

#[cfg(test)]
pub(crate) fn output_text(result: &CallToolResult) -> String {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content")
        .to_string()
}
