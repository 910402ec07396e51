//! # Concord Core
//!
//! Core library for Concord, a best-effort quorum engine for untrusted
//! JSON-RPC nodes.
//!
//! A poll sends one request to several nodes at once, groups the replies by
//! structural equality, and elects the answer most nodes agree on. Nothing is
//! retried and no node state is kept between polls: every poll stands alone.
//!
//! This crate provides the foundational components for:
//!
//! - **[`quorum`]**: Poll orchestration with equivalence grouping, majority
//!   voting, deterministic tie-breaking, and per-poll policies.
//!
//! - **[`node`]**: Outbound JSON-RPC transport with a shared connection pool,
//!   semaphore backpressure, and single-attempt calls.
//!
//! - **[`utils`]**: Canonical JSON forms used for structural comparison,
//!   ordering, and hashing of replies.
//!
//! - **[`config`]**: Layered configuration from TOML files and environment
//!   variables.
//!
//! - **[`types`]**: JSON-RPC 2.0 request and response envelopes.
//!
//! ## Poll Flow
//!
//! ```text
//! Caller (resolve)
//!       │
//!       ▼
//! ┌──────────────┐
//! │ QuorumEngine │ ─── no permit before deadline ──► Overloaded
//! └──────┬───────┘
//!        │ permit
//!        ▼
//! ┌──────────────┐
//! │  Dispatcher  │ first node_count nodes, one deadline per call
//! └──────┬───────┘
//!    ┌───┼───┐
//!    ▼   ▼   ▼
//!  node node node   (HTTP JSON-RPC, single attempt each)
//!    └───┼───┘
//!        ▼
//! ┌──────────────┐
//! │   Grouping   │ canonicalize + hash, classes in arrival order
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │    Voter     │ response floor, largest class, agreement floor
//! └──────┬───────┘
//!        ▼
//!  QuorumDecision
//! ```

pub mod config;
pub mod node;
pub mod quorum;
pub mod types;
pub mod utils;
