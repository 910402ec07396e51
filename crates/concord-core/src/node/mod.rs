//! Node communication layer.
//!
//! This module handles the outbound half of a quorum query: sending one
//! JSON-RPC request to one node and reporting exactly what came back.
//!
//! - [`HttpClient`] owns the shared connection pool and caps concurrent
//!   in-flight requests with a semaphore
//! - [`NodeEndpoint`] pairs a configured node with that client and parses
//!   replies into results or [`NodeError`]s
//!
//! Nothing in this layer retries, tracks health, or remembers failures. A
//! node that misbehaves on one call is queried like any other on the next;
//! the quorum layer absorbs every failure here as a non-answer that simply
//! cannot vote.

pub mod endpoint;
pub mod errors;
pub mod http_client;

pub use endpoint::NodeEndpoint;
pub use errors::NodeError;
pub use http_client::{HttpClient, HttpClientConfig};
