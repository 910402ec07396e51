//! Utility functions shared across the quorum engine.
//!
//! ## Canonical JSON (`json_canon`)
//! - Canonical form, total ordering, and structural hashing of responses
//! - Used for equivalence grouping during quorum voting
//! - Canonical key ordering ensures consistent hashes; optional array
//!   sorting makes element order irrelevant where a node may legally
//!   permute it

pub mod json_canon;

pub use json_canon::{
    canonical_cmp, canonical_eq, canonical_hash, canonicalize, hash_canonical_value,
};
