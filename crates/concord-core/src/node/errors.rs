use thiserror::Error;

/// Errors that can occur when querying a single node.
///
/// The quorum layer never retries a failed call and never escalates a node
/// failure into an engine failure: every variant here is absorbed as a
/// non-answer during voting. The taxonomy exists for diagnostics, so a
/// decision can report *why* each failed node produced nothing to count.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NodeError {
    /// Request exceeded the configured timeout duration.
    ///
    /// Produced both for a slow node (per-node timeout) and for a call
    /// cancelled at the global deadline.
    #[error("Request timeout")]
    Timeout,

    /// Failed to establish a connection to the node endpoint.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP-level error occurred (non-2xx status code).
    ///
    /// First field is the HTTP status code, second is the error message.
    #[error("HTTP error: {0}")]
    HttpError(u16, String),

    /// Error reply returned by the node itself.
    ///
    /// First field is the RPC error code, second is the error message. An
    /// explicit error reply is a node failure for voting purposes, exactly
    /// like a transport failure.
    #[error("RPC error: {0}")]
    Rpc(i32, String),

    /// Network-level error from the underlying HTTP client.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response from the node could not be parsed or was malformed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request could not be serialized before being sent to the node.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Maximum concurrent requests limit has been reached.
    #[error("Concurrency limit reached: {0}")]
    ConcurrencyLimit(String),
}

impl NodeError {
    /// Returns `true` if the call was abandoned due to a timeout.
    ///
    /// Late responses are indistinguishable from unresponsive nodes once the
    /// deadline has passed; both surface as this variant.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns a static string representation for log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ConnectionFailed(_) => "connection_failed",
            Self::HttpError(_, _) => "http_error",
            Self::Rpc(_, _) => "rpc_error",
            Self::Network(_) => "network_error",
            Self::InvalidResponse(_) => "invalid_response",
            Self::InvalidRequest(_) => "invalid_request",
            Self::ConcurrencyLimit(_) => "concurrency_limit",
        }
    }
}
