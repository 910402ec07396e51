//! Concurrent fan-out of one request to many nodes.

use futures_util::future;
use std::sync::Arc;

use crate::{
    node::{NodeEndpoint, NodeError},
    quorum::{policy::QuorumPolicy, types::NodeOutcome},
    types::RpcRequest,
};

/// Queries up to `policy.node_count` nodes concurrently and collects every
/// outcome.
///
/// Selection is positional: the first `node_count` endpoints of the pool are
/// queried, so callers steer preference through pool order. Outcomes come
/// back in selection order regardless of completion order, which keeps
/// grouping and tie-breaking deterministic.
///
/// Each call runs under [`QuorumPolicy::call_timeout`], the smaller of the
/// per-node timeout and the global deadline. A call still pending at that
/// point is dropped and recorded as [`NodeError::Timeout`]; wrapping every
/// call individually (instead of the whole fan-out) means one stuck node
/// never discards the replies that did complete, and a late reply can never
/// fold into the vote.
pub async fn dispatch(
    request: &RpcRequest,
    nodes: &[Arc<NodeEndpoint>],
    policy: &QuorumPolicy,
) -> Vec<NodeOutcome> {
    let query_count = policy.node_count.min(nodes.len());
    let call_timeout = policy.call_timeout();

    let calls: Vec<_> = nodes[..query_count]
        .iter()
        .map(|node| {
            let node = Arc::clone(node);
            async move {
                let name = Arc::clone(&node.config().name);
                let result = match tokio::time::timeout(
                    call_timeout,
                    node.call(request, call_timeout),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::debug!(node = %name, "node call abandoned at deadline");
                        Err(NodeError::Timeout)
                    }
                };
                NodeOutcome { node: name, result }
            }
        })
        .collect();

    future::join_all(calls).await
}
