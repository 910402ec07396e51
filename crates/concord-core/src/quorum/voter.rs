//! Majority selection over equivalence classes.
//!
//! The voter is pure: given classes in first-appearance order and the count
//! of successful responses, it either names a winning class, declares a
//! clean "no result", or fails the poll. It never looks at node identities
//! and never mutates anything.

use crate::quorum::{errors::QuorumError, policy::QuorumPolicy, types::EquivalenceClass};

/// Selects the winning equivalence class, if any.
///
/// `successful` is the number of successful responses behind `classes` (the
/// sum of all class counts). Checks run in a fixed precedence:
///
/// 1. Fewer than `min_responses` successes fail the poll outright; an
///    agreeing minority below the floor is never trusted.
/// 2. Zero successes under a policy that allows it is `Ok(None)`, a clean
///    "no result" rather than an error.
/// 3. The class with the most members wins; on a tie the earliest class
///    wins, so the outcome is deterministic for a given outcome order.
/// 4. The winner must still meet the `min_agreement` floor.
///
/// # Errors
///
/// [`QuorumError::InsufficientQuorum`] below the response floor,
/// [`QuorumError::QuorumNotReached`] when the best class is too small.
pub fn select_winner(
    classes: &[EquivalenceClass],
    successful: usize,
    policy: &QuorumPolicy,
) -> Result<Option<usize>, QuorumError> {
    if successful < policy.min_responses {
        return Err(QuorumError::InsufficientQuorum {
            received: successful,
            required: policy.min_responses,
        });
    }

    let mut winner: Option<usize> = None;
    let mut best_count = 0;
    for (index, class) in classes.iter().enumerate() {
        // Strictly greater keeps the earliest class on a tie.
        if class.count > best_count {
            winner = Some(index);
            best_count = class.count;
        }
    }

    let Some(winner) = winner else {
        return Ok(None);
    };

    let required = policy.min_agreement.required_count(successful);
    if best_count < required {
        return Err(QuorumError::QuorumNotReached { agreement: best_count, required });
    }

    Ok(Some(winner))
}
