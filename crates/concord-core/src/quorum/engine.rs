//! Quorum engine orchestration.
//!
//! This module provides the [`QuorumEngine`], the single inbound entry point
//! for resolving one request against a node pool. The pure halves of the
//! algorithm live in [`super::grouping`] and [`super::voter`]; the fan-out
//! lives in [`super::dispatcher`].

use std::{sync::Arc, time::Instant};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::{
    dispatcher,
    errors::QuorumError,
    grouping,
    policy::QuorumPolicy,
    types::{DecisionMetadata, NodeOutcome, QuorumDecision},
    voter,
};
use crate::{node::NodeEndpoint, types::RpcRequest};

/// Default cap on concurrently running polls.
const DEFAULT_MAX_CONCURRENT_POLLS: usize = 100;

/// Stateless orchestrator for quorum polls.
///
/// The engine holds no node state, no response history, and no policy: the
/// policy arrives with each call, and two concurrent calls never influence
/// each other. The only piece of shared state is a backpressure semaphore
/// bounding the number of polls in flight.
pub struct QuorumEngine {
    /// Semaphore for limiting concurrent polls (backpressure)
    query_semaphore: Arc<Semaphore>,
}

impl QuorumEngine {
    /// Creates an engine allowing at most `max_concurrent_polls` polls at once.
    #[must_use]
    pub fn new(max_concurrent_polls: usize) -> Self {
        Self { query_semaphore: Arc::new(Semaphore::new(max_concurrent_polls)) }
    }

    /// Resolves one request against a node pool under the given policy.
    ///
    /// Dispatches the request to up to `policy.node_count` nodes, groups the
    /// successful replies into equivalence classes, and votes. The returned
    /// decision carries the winning reply (or `None` for a clean "no
    /// result") along with every per-node outcome for diagnostics.
    ///
    /// The engine never retries a node and never mutates node state; a
    /// failed poll leaves nothing behind.
    ///
    /// # Errors
    ///
    /// - [`QuorumError::InvalidPolicy`] if the policy fails validation
    /// - [`QuorumError::Overloaded`] if the backpressure cap is saturated
    ///   for the whole global deadline
    /// - [`QuorumError::InsufficientQuorum`] / [`QuorumError::QuorumNotReached`]
    ///   when the poll completes without a trustworthy winner
    pub async fn resolve(
        &self,
        request: &RpcRequest,
        nodes: &[Arc<NodeEndpoint>],
        policy: &QuorumPolicy,
    ) -> Result<QuorumDecision, QuorumError> {
        policy.validate().map_err(QuorumError::InvalidPolicy)?;

        // Cap the permit wait at the global deadline so a saturated engine
        // fails fast instead of queueing callers indefinitely.
        let _permit = tokio::time::timeout(
            policy.global_timeout(),
            Arc::clone(&self.query_semaphore).acquire_owned(),
        )
        .await
        .map_err(|_| {
            warn!(
                method = %request.method,
                available_permits = self.query_semaphore.available_permits(),
                "quorum poll permit acquisition timeout - backpressure applied"
            );
            QuorumError::Overloaded("permit wait exceeded the global deadline".to_string())
        })?
        .map_err(|_| QuorumError::Overloaded("quorum engine shutting down".to_string()))?;

        let start = Instant::now();

        debug!(
            method = %request.method,
            node_count = policy.node_count.min(nodes.len()),
            "executing quorum poll"
        );

        let outcomes = dispatcher::dispatch(request, nodes, policy).await;

        for outcome in &outcomes {
            if let Err(error) = &outcome.result {
                warn!(
                    node = %outcome.node,
                    kind = error.kind(),
                    error = %error,
                    "node failed during quorum poll"
                );
            }
        }

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        decide(outcomes, policy, duration_ms)
    }
}

impl Default for QuorumEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT_POLLS)
    }
}

/// Turns collected outcomes into a decision.
///
/// This is the pure core of the engine, split out so recorded outcomes can
/// be replayed against a policy without any networking.
///
/// # Errors
///
/// Propagates the voter's [`QuorumError::InsufficientQuorum`] and
/// [`QuorumError::QuorumNotReached`].
pub fn decide(
    outcomes: Vec<NodeOutcome>,
    policy: &QuorumPolicy,
    duration_ms: u64,
) -> Result<QuorumDecision, QuorumError> {
    let total_queried = outcomes.len();
    let classes = grouping::group_outcomes(&outcomes, policy.order_insensitive_arrays);
    let successful: usize = classes.iter().map(|class| class.count).sum();

    match voter::select_winner(&classes, successful, policy)? {
        Some(index) => {
            let winning_response = classes[index].response.clone();
            let agreement_count = classes[index].count;
            let dissenting_nodes: Vec<Arc<str>> = classes
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != index)
                .flat_map(|(_, class)| class.nodes.iter().map(Arc::clone))
                .collect();

            debug!(
                agreement = agreement_count,
                total_queried,
                classes = classes.len(),
                duration_ms,
                "quorum reached"
            );

            Ok(QuorumDecision {
                response: Some(winning_response),
                agreement_count,
                total_queried,
                dissenting_nodes,
                outcomes,
                metadata: DecisionMetadata { classes, duration_ms },
            })
        }
        None => {
            debug!(total_queried, duration_ms, "quorum poll produced no result");

            Ok(QuorumDecision {
                response: None,
                agreement_count: 0,
                total_queried,
                dissenting_nodes: Vec::new(),
                outcomes,
                metadata: DecisionMetadata { classes, duration_ms },
            })
        }
    }
}
