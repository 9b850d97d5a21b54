//! HTTP fetch pipeline for pre-caching and cache misses.
//!
//! ### URL Canonicalization
//! - Manifest paths resolve against the configured origin
//! - Lowercase host, remove fragments, preserve query string
//!
//! ### Response Handling
//! - Every HTTP response is returned unchanged, including non-2xx
//! - Transport failures map to `NETWORK_ERROR`
//! - Max body bytes: 5MB (configurable)
//! - No timeout unless one is configured

pub mod network;
pub mod url;

use bytes::Bytes;
use pwa_cache_core::{AppConfig, AssetRequest, AssetResponse, Error};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, canonicalize, resolve};
pub use network::Network;

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "pwa-cache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: none)
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "pwa-cache/0.1".to_string(), max_bytes: 5 * 1024 * 1024, timeout: None, max_redirects: 5 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// reqwest-backed [`Network`].
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn map_send_error(&self, request: &AssetRequest, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::FetchTimeout(format!("{request}: {err}"))
        } else {
            Error::Network(format!("{request}: {err}"))
        }
    }

    fn check_size(&self, len: usize) -> Result<(), Error> {
        if len > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }
        Ok(())
    }
}

/// Response headers as stored name/value text.
///
/// Header values are decoded as UTF-8 lossily, so a value carrying non-UTF-8
/// bytes (legal but rare in HTTP) is stored with replacement characters. Only
/// responses whose headers are valid UTF-8 round-trip through the store
/// byte for byte.
fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
        .collect()
}

#[async_trait::async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {e}", request.method)))?;

        let response = self
            .http
            .request(method, request.url.clone())
            .send()
            .await
            .map_err(|e| self.map_send_error(request, e))?;

        if let Some(len) = response.content_length() {
            self.check_size(len as usize)?;
        }

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = header_pairs(response.headers());

        let body: Bytes = response.bytes().await.map_err(|e| self.map_send_error(request, e))?;
        self.check_size(body.len())?;

        tracing::debug!(
            request = %request,
            final_url = %final_url,
            status,
            bytes = body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched from network"
        );

        Ok(AssetResponse { url: final_url, status, headers, body })
    }
}
