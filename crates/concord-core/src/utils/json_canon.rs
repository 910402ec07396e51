//! Canonical JSON forms for quorum comparison.
//!
//! Voting needs to decide whether two node responses are "the same answer".
//! This module provides the three primitives that decision rests on:
//!
//! - [`canonicalize`]: a pure, total transform into a canonical form. With
//!   `unordered_arrays` set, arrays are sorted into a deterministic order so
//!   `[x, y]` and `[y, x]` canonicalize identically.
//! - [`canonical_cmp`]: a total order over JSON values, used to sort array
//!   elements deterministically and never reporting `Equal` for values that
//!   structural equality distinguishes.
//! - [`canonical_hash`]: a 64-bit structural hash over a value, agreeing with
//!   `serde_json::Value` equality (object key order never affects the hash).
//!
//! Equality between canonical forms is plain `serde_json::Value` equality:
//! structural, map-key-order-independent, and exact on numbers (an integer
//! never equals a float, and `0.01` never equals `0.0099`). The only value
//! rewritten during canonicalization is the float `-0.0`, which folds to
//! `0.0`: the two are equal under value equality but differ in bit pattern,
//! so leaving them apart would let equal values hash or sort differently.
//!
//! # Type Discrimination
//!
//! Each JSON type hashes behind a discriminant byte to prevent collisions:
//! - Null: 0u8
//! - Bool: 1u8 + bool value
//! - Number: 2u8 + sub-discriminant (0 i64, 1 u64, 2 f64) + representation
//! - String: 3u8 + bytes
//! - Array: 4u8 + length + each element
//! - Object: 5u8 + length + sorted (key, value) pairs
//!
//! The same type ranking (null < bool < number < string < array < object)
//! drives [`canonical_cmp`] across mismatched types.

use ahash::AHasher;
use serde_json::{Map, Number, Value};
use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

/// Converts a response value into its canonical form.
///
/// Pure and total: any well-formed JSON value canonicalizes, there is no
/// failure path. Scalars map to themselves (`-0.0` folds to `0.0`), object
/// entries canonicalize recursively, and array elements canonicalize
/// recursively and, when `unordered_arrays` is set, are then sorted by
/// [`canonical_cmp`] so element order stops mattering.
#[must_use]
pub fn canonicalize(value: &Value, unordered_arrays: bool) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => value.clone(),
        Value::Number(n) => Value::Number(normalize_number(n)),
        Value::Array(items) => {
            let mut canonical: Vec<Value> =
                items.iter().map(|item| canonicalize(item, unordered_arrays)).collect();
            if unordered_arrays {
                canonical.sort_unstable_by(canonical_cmp);
            }
            Value::Array(canonical)
        }
        Value::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, entry)| (key.clone(), canonicalize(entry, unordered_arrays)))
                .collect(),
        ),
    }
}

/// Structural equality with optional array-order insensitivity.
///
/// Equivalent to comparing the two canonical forms; prefer precomputing the
/// canonical forms when the same value is compared repeatedly (the grouper
/// does exactly that).
#[must_use]
pub fn canonical_eq(a: &Value, b: &Value, unordered_arrays: bool) -> bool {
    canonicalize(a, unordered_arrays) == canonicalize(b, unordered_arrays)
}

/// Total order over JSON values.
///
/// Type rank orders mismatched types (null < bool < number < string < array
/// < object). Within a type: booleans order false < true, strings and arrays
/// lexicographically, objects by their sorted (key, value) pairs. Numbers
/// compare exactly; see [`cmp_number`] for the integer/float rule.
///
/// On canonical forms this comparator returns `Equal` exactly when value
/// equality holds, which is what makes sorted arrays a sound canonical form:
/// equal multisets always sort into pairwise-equal sequences.
#[must_use]
pub fn canonical_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => cmp_number(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => cmp_array(x, y),
        (Value::Object(x), Value::Object(y)) => cmp_object(x, y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Computes the canonical hash of a value.
///
/// The caller is expected to pass an already-canonical value when
/// `unordered_arrays` semantics are wanted; hashing itself visits arrays in
/// order (object keys are always visited sorted, matching value equality).
#[must_use]
pub fn canonical_hash(value: &Value) -> u64 {
    let mut hasher = AHasher::default();
    hash_canonical_value(value, &mut hasher);
    hasher.finish()
}

/// Hashes a `serde_json::Value` directly without serialization.
///
/// Traverses the structure and hashes each component behind its discriminant
/// byte. Object keys are sorted first, so insertion order never affects the
/// hash; two values equal under `serde_json::Value` equality always hash
/// identically.
pub fn hash_canonical_value(value: &Value, hasher: &mut impl Hasher) {
    match value {
        Value::Null => {
            0u8.hash(hasher);
        }
        Value::Bool(b) => {
            1u8.hash(hasher);
            b.hash(hasher);
        }
        Value::Number(n) => {
            2u8.hash(hasher);
            // Hash number by its components to handle all numeric types consistently
            if let Some(i) = n.as_i64() {
                0u8.hash(hasher);
                i.hash(hasher);
            } else if let Some(u) = n.as_u64() {
                1u8.hash(hasher);
                u.hash(hasher);
            } else if let Some(f) = n.as_f64() {
                2u8.hash(hasher);
                // -0.0 == 0.0 under value equality; fold the sign bit so the
                // hash agrees. serde_json numbers are always finite, so no
                // NaN/infinity patterns can reach this point.
                let bits = if f == 0.0 { 0.0f64.to_bits() } else { f.to_bits() };
                bits.hash(hasher);
            }
        }
        Value::String(s) => {
            3u8.hash(hasher);
            s.hash(hasher);
        }
        Value::Array(items) => {
            4u8.hash(hasher);
            items.len().hash(hasher);
            for item in items {
                hash_canonical_value(item, hasher);
            }
        }
        Value::Object(entries) => {
            5u8.hash(hasher);
            entries.len().hash(hasher);

            // Sort keys for deterministic hashing
            // This ensures {"a":1,"b":2} and {"b":2,"a":1} produce the same hash
            let mut sorted_keys: Vec<&String> = entries.keys().collect();
            sorted_keys.sort_unstable();

            for key in sorted_keys {
                key.hash(hasher);
                if let Some(entry) = entries.get(key) {
                    hash_canonical_value(entry, hasher);
                }
            }
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Folds the float `-0.0` to `0.0`; every other number passes through.
fn normalize_number(n: &Number) -> Number {
    if n.as_i64().is_none() && n.as_u64().is_none() {
        if let Some(f) = n.as_f64() {
            if f == 0.0 {
                return Number::from_f64(0.0).unwrap_or_else(|| n.clone());
            }
        }
    }
    n.clone()
}

enum NumberClass {
    Int(i128),
    Float(f64),
}

fn number_class(n: &Number) -> NumberClass {
    if let Some(i) = n.as_i64() {
        NumberClass::Int(i128::from(i))
    } else if let Some(u) = n.as_u64() {
        NumberClass::Int(i128::from(u))
    } else {
        NumberClass::Float(n.as_f64().unwrap_or_default())
    }
}

/// Exact comparison between numbers.
///
/// Integers compare as wide integers and floats by `total_cmp`. Across the
/// two classes the comparison is mathematical, with a tie ordered integer
/// first: `serde_json` equality never equates an integer with a float, so
/// this comparator must not report `Equal` for such a pair either.
fn cmp_number(a: &Number, b: &Number) -> Ordering {
    match (number_class(a), number_class(b)) {
        (NumberClass::Int(x), NumberClass::Int(y)) => x.cmp(&y),
        (NumberClass::Float(x), NumberClass::Float(y)) => x.total_cmp(&y),
        (NumberClass::Int(x), NumberClass::Float(y)) => cmp_int_float(x, y),
        (NumberClass::Float(x), NumberClass::Int(y)) => cmp_int_float(y, x).reverse(),
    }
}

// Rounding in the cast can only perturb ordering between an integer and a
// float beyond 2^53; it never produces a spurious Equal because mathematical
// ties order the integer first.
#[allow(clippy::cast_precision_loss)]
fn cmp_int_float(int: i128, float: f64) -> Ordering {
    match (int as f64).partial_cmp(&float) {
        Some(Ordering::Equal) | None => Ordering::Less,
        Some(ord) => ord,
    }
}

fn cmp_array(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = canonical_cmp(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn cmp_object(a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
    let mut a_keys: Vec<&String> = a.keys().collect();
    let mut b_keys: Vec<&String> = b.keys().collect();
    a_keys.sort_unstable();
    b_keys.sort_unstable();

    for (key_a, key_b) in a_keys.iter().zip(&b_keys) {
        let ord = key_a.cmp(key_b);
        if ord != Ordering::Equal {
            return ord;
        }
        if let (Some(value_a), Some(value_b)) = (a.get(*key_a), b.get(*key_b)) {
            let ord = canonical_cmp(value_a, value_b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
    }
    a.len().cmp(&b.len())
}
