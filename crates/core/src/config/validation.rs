//! Checks applied to `AppConfig` once every layer has been merged.

use std::collections::HashSet;

use crate::config::AppConfig;
use thiserror::Error;

const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;
const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=300_000;
const CONCURRENCY_RANGE: std::ops::RangeInclusive<usize> = 1..=16;

/// Configuration load and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid { field: field.to_string(), reason: reason.into() }
    }
}

impl AppConfig {
    /// Reject configurations the worker cannot run with.
    ///
    /// The manifest must be non-empty with no blank or repeated paths. Byte,
    /// timeout and concurrency limits must fall inside their supported ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.trim().is_empty() {
            return Err(ConfigError::invalid("cache_name", "must not be empty"));
        }
        if self.cache_name.trim() != self.cache_name {
            return Err(ConfigError::invalid("cache_name", "must not have leading or trailing whitespace"));
        }

        self.origin_url()?;
        self.validate_manifest()?;

        if self.max_bytes == 0 || self.max_bytes > MAX_BODY_BYTES {
            return Err(ConfigError::invalid("max_bytes", "must be between 1 byte and 50MB"));
        }

        if let Some(timeout_ms) = self.timeout_ms
            && !TIMEOUT_RANGE_MS.contains(&timeout_ms)
        {
            return Err(ConfigError::invalid("timeout_ms", "must be between 100ms and 5 minutes when set"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid("user_agent", "must not be empty"));
        }

        if !CONCURRENCY_RANGE.contains(&self.install_concurrency) {
            return Err(ConfigError::invalid("install_concurrency", "must be between 1 and 16"));
        }

        if self.purge_stale_caches {
            tracing::warn!(
                cache_name = %self.cache_name,
                "purge_stale_caches is enabled; other named stores are deleted on activation"
            );
        }

        Ok(())
    }

    fn validate_manifest(&self) -> Result<(), ConfigError> {
        if self.manifest.is_empty() {
            return Err(ConfigError::invalid("manifest", "must list at least one path"));
        }

        let mut seen = HashSet::new();
        for path in &self.manifest {
            let path = path.trim();
            if path.is_empty() {
                return Err(ConfigError::invalid("manifest", "paths must not be empty"));
            }
            if !seen.insert(path) {
                return Err(ConfigError::invalid("manifest", format!("duplicate path: {path}")));
            }
        }
        Ok(())
    }
}
