//! pwa-cache server entry point.
//!
//! Boots the worker, starts its registration lifecycle in the background, and
//! serves the MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use pwa_cache_client::{FetchClient, FetchConfig};
use pwa_cache_core::{AppConfig, CacheStorage};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod dispatch;
mod error;
mod handler;
mod tools;
mod worker;

use dispatch::Dispatcher;
use worker::ServiceWorker;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        origin = %config.origin,
        cache = %config.cache_name,
        assets = config.manifest.len(),
        db = %config.db_path.display(),
        "Starting pwa-cache server on stdio transport"
    );

    let storage = CacheStorage::open_path(&config.db_path).await?;
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let worker = Arc::new(ServiceWorker::register(&config, storage.clone(), network)?);
    let (dispatcher, event_loop) = Dispatcher::spawn(Arc::clone(&worker));

    let registration = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatch::register(&dispatcher).await })
    };

    let handler = handler::PwaCacheServer::new(dispatcher.clone(), worker);
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    registration.abort();
    if let Err(e) = dispatcher.terminate().await {
        tracing::warn!(error = %e, "terminate on shutdown failed");
    }
    event_loop.abort();
    if let Err(e) = storage.close().await {
        tracing::warn!(error = %e, "closing cache storage failed");
    }

    tracing::info!("pwa-cache server stopped");
    Ok(())
}
