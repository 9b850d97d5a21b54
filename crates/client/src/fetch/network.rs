//! The network seam the worker fetches through.

use pwa_cache_core::{AssetRequest, AssetResponse, Error};

/// Anything that can turn a request into a response.
///
/// Implementations return every HTTP response as `Ok`, whatever its status;
/// only transport-level failures are errors. Deciding whether a status is
/// acceptable is left to the caller.
#[async_trait::async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, Error>;
}
