//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PWA_CACHE_*)
//! 2. TOML config file (if PWA_CACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Which HTTP statuses count as a successful fetch while installing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Only 2xx responses are accepted; anything else fails the install.
    #[default]
    RequireOk,
    /// Every HTTP response is stored, whatever its status.
    AcceptAny,
}

impl StatusPolicy {
    pub fn accepts(self, status: u16) -> bool {
        match self {
            StatusPolicy::RequireOk => (200..300).contains(&status),
            StatusPolicy::AcceptAny => true,
        }
    }
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PWA_CACHE_*)
/// 2. TOML config file (if PWA_CACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding every named store.
    ///
    /// Set via PWA_CACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Version-qualified name of the store this worker installs into.
    ///
    /// Set via PWA_CACHE_CACHE_NAME environment variable.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Origin that manifest paths and relative requests resolve against.
    ///
    /// Set via PWA_CACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Asset paths pre-cached at install time, in order.
    ///
    /// Set via PWA_CACHE_MANIFEST environment variable (e.g. `["/", "/app.js"]`).
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via PWA_CACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via PWA_CACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Optional HTTP request timeout in milliseconds. Unset means a hung
    /// request hangs.
    ///
    /// Set via PWA_CACHE_TIMEOUT_MS environment variable.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Whether non-2xx responses fail the install.
    ///
    /// Set via PWA_CACHE_INSTALL_STATUS_POLICY (`require_ok` or `accept_any`).
    #[serde(default)]
    pub install_status_policy: StatusPolicy,

    /// Maximum number of manifest fetches in flight during install.
    ///
    /// Set via PWA_CACHE_INSTALL_CONCURRENCY environment variable.
    #[serde(default = "default_install_concurrency")]
    pub install_concurrency: usize,

    /// Delete every other named store when the worker activates.
    ///
    /// Set via PWA_CACHE_PURGE_STALE_CACHES environment variable.
    #[serde(default)]
    pub purge_stale_caches: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pwa-cache.sqlite")
}

fn default_cache_name() -> String {
    "pwa-cache-v1".into()
}

fn default_origin() -> String {
    "http://localhost:8000".into()
}

fn default_manifest() -> Vec<String> {
    vec!["/".into(), "/static/app.js".into(), "/static/manifest.json".into()]
}

fn default_user_agent() -> String {
    "pwa-cache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_install_concurrency() -> usize {
    4
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_name: default_cache_name(),
            origin: default_origin(),
            manifest: default_manifest(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: None,
            install_status_policy: StatusPolicy::default(),
            install_concurrency: default_install_concurrency(),
            purge_stale_caches: false,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Parsed origin URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin is not an http(s) URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.origin.trim())
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid { field: "origin".into(), reason: format!("unsupported scheme: {scheme}") }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PWA_CACHE_`
    /// 2. TOML file from `PWA_CACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PWA_CACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PWA_CACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
