//! Equivalence grouping of successful replies.
//!
//! This is the first half of the vote: every successful reply is reduced to
//! its canonical payload and replies with identical canonical forms collapse
//! into one [`EquivalenceClass`]. Hashes are only an index; membership is
//! always confirmed by comparing the canonical forms themselves, so a hash
//! collision can never merge two different answers.
//!
//! # Performance
//!
//! - One canonicalization and one hash per reply
//! - `HashMap` buckets give O(1) candidate lookup; equality runs only
//!   against candidates sharing the hash

use std::{collections::HashMap, sync::Arc};

use crate::{
    quorum::types::{EquivalenceClass, NodeOutcome},
    utils::json_canon::{canonical_hash, canonicalize},
};

static NULL_PAYLOAD: serde_json::Value = serde_json::Value::Null;

/// Groups successful outcomes into equivalence classes.
///
/// Classes come back in first-appearance order; the voter relies on that
/// order to break ties deterministically. Failed outcomes are skipped
/// entirely and influence the poll only through the counts the caller keeps.
///
/// With `order_insensitive_arrays` set, replies differing only in array
/// element order land in the same class.
#[must_use]
pub fn group_outcomes(
    outcomes: &[NodeOutcome],
    order_insensitive_arrays: bool,
) -> Vec<EquivalenceClass> {
    let mut classes: Vec<EquivalenceClass> = Vec::new();
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::with_capacity(outcomes.len());

    for outcome in outcomes {
        let Ok(response) = &outcome.result else { continue };

        let payload = response.result.as_ref().unwrap_or(&NULL_PAYLOAD);
        let canonical = canonicalize(payload, order_insensitive_arrays);
        let hash = canonical_hash(&canonical);

        let bucket = buckets.entry(hash).or_default();
        match bucket.iter().find(|&&index| classes[index].canonical == canonical) {
            Some(&index) => {
                let class = &mut classes[index];
                class.nodes.push(Arc::clone(&outcome.node));
                class.count += 1;
            }
            None => {
                bucket.push(classes.len());
                classes.push(EquivalenceClass {
                    canonical,
                    canonical_hash: hash,
                    nodes: vec![Arc::clone(&outcome.node)],
                    count: 1,
                    response: response.clone(),
                });
            }
        }
    }

    classes
}
