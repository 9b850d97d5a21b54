//! Unified error types for pwa-cache.
//!
//! Every variant carries a stable, machine-readable prefix so failures
//! surfaced through the tool interface can be matched on by callers.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the offline asset cache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL, duplicate manifest path).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// No stored response for the given request.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored entry could not be decoded.
    #[error("CACHE_ERROR: corrupt entry: {0}")]
    CorruptEntry(String),

    /// The network request itself failed (connection refused, DNS, reset).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// A response was received but its status was rejected.
    #[error("HTTP_STATUS: {url} returned {status}")]
    HttpStatus { url: String, status: u16 },

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// The install unit of work failed as a whole.
    #[error("INSTALL_FAILED: {0}")]
    InstallFailed(String),

    /// A lifecycle event arrived in a state that cannot accept it.
    #[error("INVALID_STATE: {0}")]
    InvalidState(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::InvalidUrl(_) => -32003,
            Error::CacheMiss(_) => -32001,
            Error::Database(_) | Error::MigrationFailed(_) | Error::CorruptEntry(_) => -32002,
            Error::Network(_) => -32004,
            Error::HttpStatus { .. } => -32005,
            Error::FetchTimeout(_) => -32006,
            Error::FetchTooLarge(_) => -32007,
            Error::InstallFailed(_) => -32008,
            Error::InvalidState(_) => -32009,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
