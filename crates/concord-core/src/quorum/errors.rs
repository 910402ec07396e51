use thiserror::Error;

/// Errors the quorum layer itself can raise.
///
/// Individual node failures never appear here; they are absorbed as dissent
/// and reported through the decision's outcome list. A `QuorumError` means
/// the poll as a whole could not produce a trustworthy answer.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum QuorumError {
    /// Fewer successful responses arrived than the policy's minimum.
    ///
    /// Raised before any winner is considered; an agreeing minority below
    /// this floor is still not trusted.
    #[error("Insufficient quorum: {received} of {required} required responses")]
    InsufficientQuorum { received: usize, required: usize },

    /// Responses arrived but no equivalence class met the agreement floor.
    #[error("Quorum not reached: best agreement {agreement}, {required} required")]
    QuorumNotReached { agreement: usize, required: usize },

    /// Too many polls already in flight.
    #[error("Quorum engine overloaded: {0}")]
    Overloaded(String),

    /// The policy failed validation before any node was queried.
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),
}
