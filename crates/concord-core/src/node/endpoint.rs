use std::{sync::Arc, time::Duration};

use crate::{
    node::{HttpClient, NodeError},
    types::{NodeConfig, RpcRequest, RpcResponse},
};

/// A single queryable node endpoint.
///
/// Pairs a node's configuration with the shared HTTP client. Carries no
/// health tracking and no failure memory: every call stands alone, and a
/// failed call surfaces to the voter as dissent rather than changing how the
/// next call behaves.
pub struct NodeEndpoint {
    config: NodeConfig,
    http_client: Arc<HttpClient>,
}

impl NodeEndpoint {
    #[must_use]
    pub fn new(config: NodeConfig, http_client: Arc<HttpClient>) -> Self {
        Self { config, http_client }
    }

    /// Returns a reference to the node configuration.
    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Sends a request to this node and parses the reply.
    ///
    /// The timeout covers the full HTTP exchange; the caller decides what it
    /// is (the dispatcher derives it from the quorum policy).
    ///
    /// # Errors
    ///
    /// Returns `NodeError::InvalidRequest` if request serialization fails.
    /// Returns `NodeError::InvalidResponse` if the reply is not parseable or
    /// carries neither a result nor an error member (a literal `null` result
    /// is indistinguishable from an absent one and counts as missing).
    /// Returns `NodeError::Rpc` if the node answered with an error reply.
    /// Transport failures propagate from the HTTP client unchanged.
    pub async fn call(
        &self,
        request: &RpcRequest,
        timeout: Duration,
    ) -> Result<RpcResponse, NodeError> {
        tracing::debug!(
            node = %self.config.name,
            method = %request.method,
            "sending request to node"
        );

        let start_time = std::time::Instant::now();

        let body = serde_json::to_vec(request).map_err(|e| {
            NodeError::InvalidRequest(format!("Failed to serialize request: {e}"))
        })?;

        let response_bytes = self
            .http_client
            .send_request(&self.config.url, bytes::Bytes::from(body), timeout)
            .await?;

        let elapsed_ms = start_time.elapsed().as_millis();
        #[allow(clippy::cast_possible_truncation)]
        let response_time = elapsed_ms as u64;

        let reply: RpcResponse = serde_json::from_slice(&response_bytes)
            .map_err(|e| NodeError::InvalidResponse(format!("Invalid JSON: {e}")))?;

        tracing::debug!(
            node = %self.config.name,
            response_time_ms = response_time,
            "node replied"
        );

        check_reply(reply)
    }
}

/// Classifies a parsed reply.
///
/// An explicit error reply becomes [`NodeError::Rpc`]; the error member wins
/// when a malformed node sends both members.
fn check_reply(reply: RpcResponse) -> Result<RpcResponse, NodeError> {
    if let Some(error) = &reply.error {
        return Err(NodeError::Rpc(error.code, error.message.clone()));
    }
    if reply.result.is_none() {
        return Err(NodeError::InvalidResponse(
            "reply carries neither result nor error".to_string(),
        ));
    }
    Ok(reply)
}
