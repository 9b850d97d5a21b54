//! Structured errors for the pwa-cache host.

use pwa_cache_core::Error;
use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Failures delivering a lifecycle event to the worker.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The event loop has stopped and no longer accepts events.
    #[error("DISPATCH_CLOSED: event loop is not running")]
    LoopClosed,

    /// The task handling an event ended without resolving its result.
    #[error("DISPATCH_DROPPED: {0} handler ended without a result")]
    ResultDropped(&'static str),

    /// The worker resolved the event as a failure.
    #[error(transparent)]
    Worker(#[from] Error),
}

impl From<HostError> for McpError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Worker(e) => e.into(),
            other => McpError { code: ErrorCode(-32603), message: other.to_string().into(), data: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_error_keeps_code() {
        let err: McpError = HostError::from(Error::CacheMiss("GET http://localhost:8000/".into())).into();
        assert_eq!(err.code.0, -32001);
    }

    #[test]
    fn test_loop_closed_is_internal() {
        let err: McpError = HostError::LoopClosed.into();
        assert_eq!(err.code.0, -32603);
        assert!(err.message.contains("DISPATCH_CLOSED"));
    }
}
