//! Core type definitions for JSON-RPC payloads and node descriptors.
//!
//! # Type Categories
//!
//! ## JSON-RPC Protocol Types
//! - [`RpcRequest`], [`RpcResponse`], [`RpcError`]: Protocol conformance
//!
//! ## Node Types
//! - [`NodeConfig`]: Endpoint descriptor handed to the engine by the caller
//!
//! The engine treats the request as opaque: it serializes it unchanged to every
//! queried node and never inspects `method` or `params`. Voting operates on the
//! `result` member of successful responses.

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, sync::Arc};

/// JSON-RPC protocol version constant to avoid repeated allocations.
/// Use `JSONRPC_VERSION_COW` for constructing requests/responses without allocation.
pub const JSONRPC_VERSION: &str = "2.0";

/// Pre-allocated `Cow` for JSON-RPC version - zero allocation for static usage.
pub const JSONRPC_VERSION_COW: Cow<'static, str> = Cow::Borrowed(JSONRPC_VERSION);

/// JSON-RPC 2.0 request structure.
///
/// Represents the logical query the caller hands to the engine. The engine
/// forwards it byte-identically to every selected node.
///
/// # Fields
///
/// - `jsonrpc`: Protocol version (always "2.0")
/// - `method`: RPC method name (e.g., `getBalances`, `getInclusionStates`)
/// - `params`: Optional method parameters as JSON value
/// - `id`: Request identifier that must be echoed in the response
///
/// # Performance Notes
///
/// - `jsonrpc`: Uses `Cow<'static, str>` to avoid allocation when constructing with the static
///   version string "2.0". Use `JSONRPC_VERSION_COW` for zero-cost construction.
/// - `id`: Uses `Arc<serde_json::Value>` to enable cheap cloning when the request ID needs to be
///   copied to responses.
///
/// # Example
///
/// ```
/// use concord_core::types::RpcRequest;
/// use serde_json::json;
///
/// let request = RpcRequest::new("getBalances", Some(json!({"addresses": ["abc"]})), json!(1));
///
/// assert_eq!(request.method, "getBalances");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: Cow<'static, str>,
    pub method: String,
    pub params: Option<serde_json::Value>,
    pub id: Arc<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
///
/// A response contains either a `result` (success) or an `error` (failure),
/// but never both. Responses carrying an `error` member are converted to
/// failure outcomes by the node layer and never reach voting.
///
/// # Example
///
/// ```
/// use concord_core::types::RpcResponse;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// // Success response
/// let response = RpcResponse::success(json!({"balances": ["42"]}), Arc::new(json!(1)));
/// assert!(response.result.is_some());
/// assert!(response.error.is_none());
///
/// // Error response
/// let response = RpcResponse::error(-32601, "Method not found".to_string(), Arc::new(json!(1)));
/// assert!(response.error.is_some());
/// assert!(response.result.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: Cow<'static, str>,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Arc<serde_json::Value>,
}

impl RpcRequest {
    /// Creates a new JSON-RPC request with zero allocation for the version string.
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        params: Option<serde_json::Value>,
        id: serde_json::Value,
    ) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, method: method.into(), params, id: Arc::new(id) }
    }
}

impl RpcResponse {
    /// Creates a successful JSON-RPC response with zero allocation for the version string.
    #[must_use]
    pub fn success(result: serde_json::Value, id: Arc<serde_json::Value>) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, result: Some(result), error: None, id }
    }

    /// Creates an error JSON-RPC response with zero allocation for the version string.
    #[must_use]
    pub fn error(code: i32, message: String, id: Arc<serde_json::Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION_COW,
            result: None,
            error: Some(RpcError { code, message, data: None }),
            id,
        }
    }

    /// Creates a new response using a request's ID (cheap Arc clone).
    #[must_use]
    pub fn from_request_id(request: &RpcRequest) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION_COW,
            result: None,
            error: None,
            id: Arc::clone(&request.id),
        }
    }
}

/// JSON-RPC 2.0 error object.
///
/// Standard error codes follow the JSON-RPC 2.0 convention:
///
/// - `-32700`: Parse error (invalid JSON)
/// - `-32600`: Invalid request (malformed JSON-RPC)
/// - `-32601`: Method not found
/// - `-32602`: Invalid params
/// - `-32603`: Internal error
/// - `-32000` to `-32099`: Server-defined errors (implementation-specific)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Descriptor for a single queryable node endpoint.
///
/// Supplied by the external collaborator that owns endpoint discovery and
/// health. The engine uses `name` purely for attribution in outcomes and
/// logs; it never mutates node state.
///
/// # Example
///
/// ```
/// use concord_core::types::NodeConfig;
/// use std::sync::Arc;
///
/// let config = NodeConfig {
///     name: Arc::from("node-eu-1"),
///     url: "https://node-eu-1.example.org:14265".to_string(),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub name: Arc<str>,
    pub url: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self { name: Arc::from(""), url: String::new() }
    }
}
