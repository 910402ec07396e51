//! Quorum outcome and decision types.

use crate::{node::NodeError, types::RpcResponse};
use std::sync::Arc;

/// Outcome of a single node call within one poll.
///
/// Every queried node produces exactly one outcome, in query order, whether
/// it answered, failed, or was abandoned at the deadline.
#[derive(Debug)]
pub struct NodeOutcome {
    /// Name of the queried node.
    pub node: Arc<str>,
    /// The reply, or the failure that stands in for it.
    pub result: Result<RpcResponse, NodeError>,
}

impl NodeOutcome {
    /// Returns `true` if the node produced a usable reply.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Group of structurally identical successful replies.
#[derive(Debug, Clone)]
pub struct EquivalenceClass {
    /// Canonical form of the reply payload; membership was decided on this.
    pub canonical: serde_json::Value,
    /// Hash of the canonical form, used for fast bucketing.
    pub canonical_hash: u64,
    /// Names of nodes whose replies landed in this class, in arrival order.
    pub nodes: Vec<Arc<str>>,
    /// Number of member replies.
    pub count: usize,
    /// The first reply of the class, returned verbatim if the class wins.
    pub response: RpcResponse,
}

/// Result of a quorum poll.
#[derive(Debug)]
pub struct QuorumDecision {
    /// The winning reply, or `None` when the poll cleanly produced nothing
    /// (zero successful responses under a policy that permits that).
    pub response: Option<RpcResponse>,
    /// Number of nodes that agreed on the winning reply; zero without one.
    pub agreement_count: usize,
    /// Number of nodes actually queried.
    pub total_queried: usize,
    /// Nodes that answered successfully but differently from the winner.
    /// Failed nodes are not listed here; they appear in `outcomes`.
    pub dissenting_nodes: Vec<Arc<str>>,
    /// Per-node outcomes, in query order.
    pub outcomes: Vec<NodeOutcome>,
    /// Diagnostics about how the decision was reached.
    pub metadata: DecisionMetadata,
}

impl QuorumDecision {
    /// Returns `true` when the poll ended without any answer at all.
    #[must_use]
    pub fn is_no_result(&self) -> bool {
        self.response.is_none()
    }

    /// Number of successful responses that fed the vote.
    #[must_use]
    pub fn successful_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_success()).count()
    }
}

/// Quorum decision metadata.
#[derive(Debug)]
pub struct DecisionMetadata {
    /// Equivalence classes in first-appearance order.
    pub classes: Vec<EquivalenceClass>,
    /// Wall-clock duration of the poll in milliseconds.
    pub duration_ms: u64,
}
