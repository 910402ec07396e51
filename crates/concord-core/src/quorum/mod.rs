//! # Quorum Algorithm Overview
//!
//! The quorum engine answers one question: when N untrusted nodes are asked
//! the same thing, which reply (if any) deserves trust? Each poll is
//! single-shot and self-contained; nothing is learned, cached, or retried.
//!
//! ## Algorithm Steps
//!
//! 1. **Node Selection**: Take the first `node_count` endpoints of the pool
//! 2. **Parallel Query**: Send the request to all selected nodes concurrently,
//!    each call bounded by the per-node timeout and the global deadline
//! 3. **Canonicalization**: Reduce every successful reply to its canonical
//!    form (sorted object keys; optionally order-insensitive arrays)
//! 4. **Equivalence Grouping**: Collapse identical canonical forms into
//!    classes, hash-indexed but equality-confirmed
//! 5. **Vote**: The largest class wins; ties break to the earliest class
//! 6. **Floors**: The poll fails unless `min_responses` nodes answered and
//!    the winner carries `min_agreement` votes
//!
//! ## Failure Modes
//!
//! - **Node failures** (timeouts, transport errors, error replies, garbage):
//!   absorbed as dissent, never escalated
//! - **Too few responses**: [`QuorumError::InsufficientQuorum`]
//! - **No class meets the floor**: [`QuorumError::QuorumNotReached`]
//! - **Zero successes under a permissive policy**: a decision with no
//!   response, which is an answer ("nothing"), not an error
//!
//! # Module Organization
//!
//! - [`policy`]: Poll configuration ([`QuorumPolicy`], [`MinAgreement`])
//! - [`types`]: Outcome and decision types ([`QuorumDecision`], etc.)
//! - [`errors`]: Poll-level failures ([`QuorumError`])
//! - [`engine`]: Orchestration ([`QuorumEngine`] - main entry point)
//! - [`dispatcher`]: Concurrent fan-out with deadline enforcement
//! - [`grouping`]: Canonical equivalence classes
//! - [`voter`]: Majority selection and floors

pub mod dispatcher;
pub mod engine;
pub mod errors;
pub mod grouping;
pub mod policy;
pub mod types;
pub mod voter;


pub use dispatcher::dispatch;
pub use engine::{decide, QuorumEngine};
pub use errors::QuorumError;
pub use grouping::group_outcomes;
pub use policy::{MinAgreement, QuorumPolicy};
pub use types::{DecisionMetadata, EquivalenceClass, NodeOutcome, QuorumDecision};
pub use voter::select_winner;
