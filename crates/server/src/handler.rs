//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the worker and cache tools.
use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::tools::cache::{CacheDeleteParams, CacheKeysParams, CacheMatchParams, delete_impl, keys_impl, match_impl};
use crate::tools::worker::{
    WorkerActivateParams, WorkerFetchParams, WorkerInstallParams, WorkerStatusParams, activate_impl, fetch_impl,
    install_impl, status_impl,
};
use crate::worker::ServiceWorker;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for pwa-cache.
#[derive(Clone)]
pub struct PwaCacheServer {
    tool_router: ToolRouter<Self>,
    dispatcher: Dispatcher,
    worker: Arc<ServiceWorker>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PwaCacheServer {
    /// Create a new server handler.
    ///
    /// `dispatcher` must deliver events to `worker`.
    pub fn new(dispatcher: Dispatcher, worker: Arc<ServiceWorker>) -> Self {
        Self { tool_router: Self::tool_router(), dispatcher, worker }
    }

    #[tool(
        description = "Pre-cache every manifest asset into the worker's store. All-or-nothing: on any failure nothing is stored and the worker stays uninstalled."
    )]
    async fn worker_install(&self, params: Parameters<WorkerInstallParams>) -> Result<CallToolResult, McpError> {
        install_impl(&self.dispatcher, &self.worker, params.0).await
    }

    #[tool(description = "Activate an installed worker so fetches are served cache-first.")]
    async fn worker_activate(&self, params: Parameters<WorkerActivateParams>) -> Result<CallToolResult, McpError> {
        activate_impl(&self.dispatcher, &self.worker, params.0).await
    }

    /// Route one request through the worker.
    ///
    /// An active worker answers from its store when it can and falls back to a
    /// single network fetch otherwise. The network response is never stored.
    #[tool(
        description = "Fetch a URL through the worker: cache-first when active, network otherwise. Reports whether the response came from the cache or the network."
    )]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.dispatcher, &self.worker, params.0).await
    }

    #[tool(description = "Report the worker's lifecycle state, origin, manifest and stored entry count.")]
    async fn worker_status(&self, params: Parameters<WorkerStatusParams>) -> Result<CallToolResult, McpError> {
        status_impl(&self.worker, params.0).await
    }

    #[tool(description = "Look up a stored response by URL and method without touching the network.")]
    async fn cache_match(&self, params: Parameters<CacheMatchParams>) -> Result<CallToolResult, McpError> {
        match_impl(&self.worker, params.0).await
    }

    #[tool(description = "List store names, or the request keys held by one store when cache_name is given.")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        keys_impl(&self.worker, params.0).await
    }

    #[tool(description = "Delete a named store and all of its entries.")]
    async fn cache_delete(&self, params: Parameters<CacheDeleteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for PwaCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pwa-cache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Offline asset cache. Install pre-caches the manifest; fetches are served cache-first once active."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
