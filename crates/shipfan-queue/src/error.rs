//! Queue transport and dispatch error types.

use thiserror::Error;

/// Errors raised by a single queue call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, timeout, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The queue endpoint answered with a non-success status.
    #[error("Queue returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The batch call succeeded but the queue rejected some entries.
    #[error("{failed} of {total} batch entries rejected (first: {code}: {message})")]
    PartialBatch {
        failed: usize,
        total: usize,
        code: String,
        message: String,
    },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl TransportError {
    /// Returns `true` if re-running the dispatch could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Errors returned by [`Dispatcher`](crate::Dispatcher) operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The queue identifier could not be split into account and queue name.
    #[error("Invalid queue address '{identifier}': {reason}")]
    InvalidQueueAddress { identifier: String, reason: String },

    /// The configured base endpoint is not a usable URL.
    #[error("Invalid queue endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Invalid dispatcher config: {0}")]
    InvalidConfig(String),

    /// First chunk submission failure observed during a dispatch.
    #[error("Delivery of chunk {chunk} failed: {source}")]
    Delivery {
        chunk: usize,
        #[source]
        source: TransportError,
    },

    /// The concurrency gate was closed while chunks were still waiting.
    #[error("Dispatch gate closed")]
    GateClosed,

    /// A submission task panicked or was cancelled.
    #[error("Submission task failed: {0}")]
    TaskFailed(String),
}

impl DispatchError {
    /// Returns `true` if the failure happened before any network call.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidQueueAddress { .. } | Self::InvalidEndpoint { .. } | Self::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(TransportError::Http("reset".into()).is_retryable());
        assert!(TransportError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(TransportError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!TransportError::Status { status: 400, body: String::new() }.is_retryable());
    }

    #[test]
    fn delivery_keeps_source() {
        let err = DispatchError::Delivery {
            chunk: 2,
            source: TransportError::Http("boom".into()),
        };
        assert!(err.to_string().contains("chunk 2"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_precondition());
    }
}
