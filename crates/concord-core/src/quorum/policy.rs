//! Quorum policy types and defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Agreement floor the winning equivalence class must meet.
///
/// Untagged on the wire: an integer is an absolute node count, a float is a
/// fraction of the successful responses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinAgreement {
    /// Absolute number of agreeing nodes.
    Count(usize),
    /// Fraction of successful responses, `0.0 < ratio <= 1.0`.
    ///
    /// The required count is the ceiling of `ratio * successful`: a ratio
    /// landing exactly on an integer passes with exactly that many votes.
    Ratio(f64),
}

impl Default for MinAgreement {
    fn default() -> Self {
        Self::Count(default_min_agreement_count())
    }
}

impl MinAgreement {
    /// Resolves the floor to an absolute count for a poll with `successful`
    /// responses.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn required_count(&self, successful: usize) -> usize {
        match *self {
            Self::Count(count) => count,
            Self::Ratio(ratio) => (ratio * successful as f64).ceil() as usize,
        }
    }
}

/// Configuration for a single quorum poll.
///
/// The policy travels with the request rather than living inside the engine,
/// so two callers can poll the same pool under different rules concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuorumPolicy {
    /// Number of nodes to query per poll (default: 3)
    #[serde(default = "default_node_count")]
    pub node_count: usize,

    /// Minimum successful responses before a winner may be computed (default: 2).
    /// Zero disables the floor, letting an all-failure poll end as a clean
    /// "no result" instead of an error.
    #[serde(default = "default_min_responses")]
    pub min_responses: usize,

    /// Agreement floor for the winning class (default: 2 nodes)
    #[serde(default)]
    pub min_agreement: MinAgreement,

    /// Per-node call timeout in milliseconds (default: 5000)
    #[serde(default = "default_per_node_timeout_ms")]
    pub per_node_timeout_ms: u64,

    /// Deadline for the whole fan-out in milliseconds (default: 10000).
    /// Calls still pending at the deadline are abandoned and counted as
    /// timeouts; their replies can no longer influence the vote.
    #[serde(default = "default_global_timeout_ms")]
    pub global_timeout_ms: u64,

    /// Treat arrays as unordered when comparing responses (default: false).
    /// Enable for methods whose replies legally permute array elements.
    #[serde(default)]
    pub order_insensitive_arrays: bool,
}

fn default_node_count() -> usize {
    3
}

fn default_min_responses() -> usize {
    2
}

fn default_min_agreement_count() -> usize {
    2
}

fn default_per_node_timeout_ms() -> u64 {
    5000
}

fn default_global_timeout_ms() -> u64 {
    10_000
}

impl Default for QuorumPolicy {
    fn default() -> Self {
        Self {
            node_count: default_node_count(),
            min_responses: default_min_responses(),
            min_agreement: MinAgreement::default(),
            per_node_timeout_ms: default_per_node_timeout_ms(),
            global_timeout_ms: default_global_timeout_ms(),
            order_insensitive_arrays: false,
        }
    }
}

impl QuorumPolicy {
    /// Validates the policy, returning a description of the first problem.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message when a field is out of range or the
    /// fields are mutually inconsistent.
    pub fn validate(&self) -> Result<(), String> {
        if self.node_count == 0 {
            return Err("node_count must be at least 1".to_string());
        }
        if self.min_responses > self.node_count {
            return Err(format!(
                "min_responses ({}) cannot exceed node_count ({})",
                self.min_responses, self.node_count
            ));
        }
        match self.min_agreement {
            MinAgreement::Count(count) => {
                if count == 0 {
                    return Err("min_agreement count must be at least 1".to_string());
                }
                if count > self.node_count {
                    return Err(format!(
                        "min_agreement count ({count}) cannot exceed node_count ({})",
                        self.node_count
                    ));
                }
            }
            MinAgreement::Ratio(ratio) => {
                if !(ratio > 0.0 && ratio <= 1.0) {
                    return Err(format!(
                        "min_agreement ratio must be within (0.0, 1.0], got {ratio}"
                    ));
                }
            }
        }
        if self.per_node_timeout_ms == 0 {
            return Err("per_node_timeout_ms must be at least 1".to_string());
        }
        if self.global_timeout_ms == 0 {
            return Err("global_timeout_ms must be at least 1".to_string());
        }
        Ok(())
    }

    /// Per-node timeout as a [`Duration`].
    #[must_use]
    pub fn per_node_timeout(&self) -> Duration {
        Duration::from_millis(self.per_node_timeout_ms)
    }

    /// Global fan-out deadline as a [`Duration`].
    #[must_use]
    pub fn global_timeout(&self) -> Duration {
        Duration::from_millis(self.global_timeout_ms)
    }

    /// Effective budget for one node call.
    ///
    /// A per-node timeout longer than the global deadline is meaningless, so
    /// the smaller of the two wins.
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        self.per_node_timeout().min(self.global_timeout())
    }
}
