//! Integration tests for quorum polls over HTTP.
//!
//! These tests verify that polls work correctly against actual mock nodes:
//! - Agreement and dissent are attributed to the right nodes
//! - Policy floors are enforced over the wire
//! - Structural equality ignores key order but not array order
//! - The winning reply is returned verbatim with the full outcome list

use crate::mock_infrastructure::{balances_result, init_tracing, RpcMockBuilder};
use concord_core::{
    node::{HttpClient, NodeEndpoint},
    quorum::{MinAgreement, QuorumEngine, QuorumError, QuorumPolicy},
    types::{NodeConfig, RpcRequest},
};
use std::sync::Arc;

fn create_node_endpoint(name: &str, url: &str) -> Arc<NodeEndpoint> {
    let config = NodeConfig { name: Arc::from(name), url: url.to_string() };
    let http_client = Arc::new(HttpClient::new().unwrap());
    Arc::new(NodeEndpoint::new(config, http_client))
}

fn create_test_request() -> RpcRequest {
    RpcRequest::new(
        "getBalances",
        Some(serde_json::json!({"addresses": ["WKQDUZTGFKSSLACUCHHIBSRHXAYS9PWNMXM"]})),
        serde_json::json!(1),
    )
}

fn poll_policy(node_count: usize, min_responses: usize, min_agreement: usize) -> QuorumPolicy {
    QuorumPolicy {
        node_count,
        min_responses,
        min_agreement: MinAgreement::Count(min_agreement),
        per_node_timeout_ms: 5000,
        global_timeout_ms: 10_000,
        order_insensitive_arrays: false,
    }
}

/// Spins up a mockito server answering every POST with the given result.
async fn node_serving(result: &serde_json::Value) -> (mockito::ServerGuard, mockito::Mock) {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": result
            })
            .to_string(),
        )
        .create_async()
        .await;
    (server, mock)
}

#[tokio::test]
async fn test_poll_all_nodes_agree() {
    init_tracing();
    let payload = balances_result(&["114544444"], 42);

    let (server_1, _m1) = node_serving(&payload).await;
    let (server_2, _m2) = node_serving(&payload).await;
    let (server_3, _m3) = node_serving(&payload).await;

    let nodes = vec![
        create_node_endpoint("node-1", &server_1.url()),
        create_node_endpoint("node-2", &server_2.url()),
        create_node_endpoint("node-3", &server_3.url()),
    ];

    let engine = QuorumEngine::default();
    let decision =
        engine.resolve(&create_test_request(), &nodes, &poll_policy(3, 2, 2)).await.unwrap();

    assert_eq!(decision.agreement_count, 3, "all three nodes should agree");
    assert_eq!(decision.total_queried, 3);
    assert!(decision.dissenting_nodes.is_empty());
    assert_eq!(decision.outcomes.len(), 3);
    assert_eq!(decision.metadata.classes.len(), 1);

    let response = decision.response.expect("agreement should produce a winner");
    assert_eq!(response.result, Some(payload));
    assert_eq!(*response.id, serde_json::json!(1), "request id should be echoed back");
}

#[tokio::test]
async fn test_poll_majority_over_byzantine_node() {
    init_tracing();
    let correct = balances_result(&["114544444"], 42);
    let byzantine = balances_result(&["999999999"], 42);

    let (byzantine_server, _m1) = node_serving(&byzantine).await;
    let (correct_server_1, _m2) = node_serving(&correct).await;
    let (correct_server_2, _m3) = node_serving(&correct).await;

    // The byzantine node answers first in pool order; majority must still win.
    let nodes = vec![
        create_node_endpoint("byzantine-first", &byzantine_server.url()),
        create_node_endpoint("correct-1", &correct_server_1.url()),
        create_node_endpoint("correct-2", &correct_server_2.url()),
    ];

    let engine = QuorumEngine::default();
    let decision =
        engine.resolve(&create_test_request(), &nodes, &poll_policy(3, 2, 2)).await.unwrap();

    assert_eq!(decision.agreement_count, 2, "should have 2 agreeing nodes");
    assert_eq!(decision.total_queried, 3);
    assert_eq!(decision.dissenting_nodes.len(), 1, "should identify 1 byzantine node");
    assert!(
        decision.dissenting_nodes.iter().any(|name| name.as_ref() == "byzantine-first"),
        "should identify byzantine-first as dissenting"
    );

    let selected = decision.response.unwrap().result;
    assert_eq!(selected, Some(correct), "should select the majority response");
}

#[tokio::test]
async fn test_poll_all_disagree_returns_quorum_not_reached() {
    init_tracing();

    let (server_1, _m1) = node_serving(&balances_result(&["1"], 100)).await;
    let (server_2, _m2) = node_serving(&balances_result(&["2"], 101)).await;
    let (server_3, _m3) = node_serving(&balances_result(&["3"], 102)).await;

    let nodes = vec![
        create_node_endpoint("node-1", &server_1.url()),
        create_node_endpoint("node-2", &server_2.url()),
        create_node_endpoint("node-3", &server_3.url()),
    ];

    let engine = QuorumEngine::default();
    let result = engine.resolve(&create_test_request(), &nodes, &poll_policy(3, 2, 2)).await;

    match result.unwrap_err() {
        QuorumError::QuorumNotReached { agreement, required } => {
            assert_eq!(agreement, 1, "three distinct answers leave classes of one");
            assert_eq!(required, 2);
        }
        e => panic!("Expected QuorumNotReached, got {e:?}"),
    }
}

#[tokio::test]
async fn test_poll_insufficient_successes() {
    init_tracing();

    let (server_1, _m1) = node_serving(&balances_result(&["1"], 100)).await;

    // Two pool members point at a port nothing listens on.
    let nodes = vec![
        create_node_endpoint("good", &server_1.url()),
        create_node_endpoint("dead-1", "http://localhost:1"),
        create_node_endpoint("dead-2", "http://localhost:1"),
    ];

    let engine = QuorumEngine::default();
    let result = engine.resolve(&create_test_request(), &nodes, &poll_policy(3, 2, 2)).await;

    match result.unwrap_err() {
        QuorumError::InsufficientQuorum { received, required } => {
            assert_eq!(received, 1);
            assert_eq!(required, 2);
        }
        e => panic!("Expected InsufficientQuorum, got {e:?}"),
    }
}

#[tokio::test]
async fn test_poll_key_order_is_insignificant() {
    init_tracing();

    // Raw bodies so the two nodes really do send different key orders.
    let mut node_1 = RpcMockBuilder::new().await;
    node_1
        .mock_raw_body(r#"{"jsonrpc":"2.0","id":1,"result":{"milestone":42,"state":true}}"#)
        .await;
    let mut node_2 = RpcMockBuilder::new().await;
    node_2
        .mock_raw_body(r#"{"jsonrpc":"2.0","id":1,"result":{"state":true,"milestone":42}}"#)
        .await;

    let nodes = vec![
        create_node_endpoint("node-1", &node_1.url()),
        create_node_endpoint("node-2", &node_2.url()),
    ];

    let engine = QuorumEngine::default();
    let decision =
        engine.resolve(&create_test_request(), &nodes, &poll_policy(2, 2, 2)).await.unwrap();

    assert_eq!(decision.agreement_count, 2, "key order must not split the class");
    assert!(decision.dissenting_nodes.is_empty());
}

#[tokio::test]
async fn test_poll_array_order_is_significant_by_default() {
    init_tracing();

    let (server_1, _m1) = node_serving(&serde_json::json!({"hashes": ["a", "b"]})).await;
    let (server_2, _m2) = node_serving(&serde_json::json!({"hashes": ["b", "a"]})).await;

    let nodes = vec![
        create_node_endpoint("node-1", &server_1.url()),
        create_node_endpoint("node-2", &server_2.url()),
    ];

    let engine = QuorumEngine::default();
    let result = engine.resolve(&create_test_request(), &nodes, &poll_policy(2, 2, 2)).await;

    assert!(
        matches!(result, Err(QuorumError::QuorumNotReached { agreement: 1, required: 2 })),
        "permuted arrays must split the class under the default policy"
    );
}

#[tokio::test]
async fn test_poll_respects_node_count() {
    init_tracing();
    let payload = balances_result(&["7"], 9);

    let (server_1, _m1) = node_serving(&payload).await;
    let (server_2, _m2) = node_serving(&payload).await;
    let (server_3, _m3) = node_serving(&payload).await;

    // The two spare pool members must never be contacted.
    let mut spare_server_1 = mockito::Server::new_async().await;
    let spare_mock_1 =
        spare_server_1.mock("POST", "/").with_status(200).expect(0).create_async().await;
    let mut spare_server_2 = mockito::Server::new_async().await;
    let spare_mock_2 =
        spare_server_2.mock("POST", "/").with_status(200).expect(0).create_async().await;

    let nodes = vec![
        create_node_endpoint("node-1", &server_1.url()),
        create_node_endpoint("node-2", &server_2.url()),
        create_node_endpoint("node-3", &server_3.url()),
        create_node_endpoint("spare-1", &spare_server_1.url()),
        create_node_endpoint("spare-2", &spare_server_2.url()),
    ];

    let engine = QuorumEngine::default();
    let decision =
        engine.resolve(&create_test_request(), &nodes, &poll_policy(3, 2, 2)).await.unwrap();

    assert_eq!(decision.total_queried, 3, "only node_count nodes should be queried");
    assert_eq!(decision.agreement_count, 3);
    spare_mock_1.assert_async().await;
    spare_mock_2.assert_async().await;
}

#[tokio::test]
async fn test_poll_truncates_to_pool_size() {
    init_tracing();

    let (server_1, _m1) = node_serving(&balances_result(&["7"], 9)).await;
    let nodes = vec![create_node_endpoint("only", &server_1.url())];

    let engine = QuorumEngine::default();
    let decision =
        engine.resolve(&create_test_request(), &nodes, &poll_policy(3, 1, 1)).await.unwrap();

    assert_eq!(decision.total_queried, 1, "a short pool caps the fan-out");
    assert_eq!(decision.agreement_count, 1);
}

#[tokio::test]
async fn test_poll_ratio_floor_over_the_wire() {
    init_tracing();
    let agreed = balances_result(&["5"], 77);

    let (server_1, _m1) = node_serving(&agreed).await;
    let (server_2, _m2) = node_serving(&agreed).await;
    let (server_3, _m3) = node_serving(&agreed).await;
    let (server_4, _m4) = node_serving(&balances_result(&["6"], 77)).await;

    let nodes = vec![
        create_node_endpoint("node-1", &server_1.url()),
        create_node_endpoint("node-2", &server_2.url()),
        create_node_endpoint("node-3", &server_3.url()),
        create_node_endpoint("node-4", &server_4.url()),
    ];

    let policy = QuorumPolicy {
        node_count: 4,
        min_responses: 2,
        min_agreement: MinAgreement::Ratio(0.75),
        ..QuorumPolicy::default()
    };

    let engine = QuorumEngine::default();
    let decision = engine.resolve(&create_test_request(), &nodes, &policy).await.unwrap();

    assert_eq!(decision.agreement_count, 3, "3 of 4 successes meets the 0.75 ratio");
    assert_eq!(decision.dissenting_nodes.len(), 1);
}

#[tokio::test]
async fn test_poll_identical_results_with_different_ids_agree() {
    init_tracing();

    // Same result, different response ids: grouping must look only at the
    // result payload.
    let mut node_1 = RpcMockBuilder::new().await;
    node_1.mock_raw_body(r#"{"jsonrpc":"2.0","id":1,"result":{"milestone":42}}"#).await;
    let mut node_2 = RpcMockBuilder::new().await;
    node_2.mock_raw_body(r#"{"jsonrpc":"2.0","id":99,"result":{"milestone":42}}"#).await;

    let nodes = vec![
        create_node_endpoint("node-1", &node_1.url()),
        create_node_endpoint("node-2", &node_2.url()),
    ];

    let engine = QuorumEngine::default();
    let decision =
        engine.resolve(&create_test_request(), &nodes, &poll_policy(2, 2, 2)).await.unwrap();

    assert_eq!(decision.agreement_count, 2);
    // The winner is the first class member's reply, id included.
    assert_eq!(*decision.response.unwrap().id, serde_json::json!(1));
}

#[tokio::test]
async fn test_poll_forwards_the_request_method() {
    init_tracing();
    let payload = balances_result(&["3"], 11);

    // These mocks match only bodies carrying the caller's method name, so
    // agreement doubles as proof the request went out unchanged.
    let mut node_a = RpcMockBuilder::new().await;
    node_a.mock_method("getBalances", &payload).await;
    let mut node_b = RpcMockBuilder::new().await;
    node_b.mock_method("getBalances", &payload).await;

    let nodes = vec![
        create_node_endpoint("node-a", &node_a.url()),
        create_node_endpoint("node-b", &node_b.url()),
    ];

    let engine = QuorumEngine::default();
    let decision =
        engine.resolve(&create_test_request(), &nodes, &poll_policy(2, 2, 2)).await.unwrap();

    assert_eq!(decision.agreement_count, 2);
    assert!(node_a.verify_all_called());
    assert!(node_b.verify_all_called());
}

#[tokio::test]
async fn test_sequential_polls_reuse_the_engine() {
    init_tracing();
    let payload = balances_result(&["1"], 5);

    let (server_1, _m1) = node_serving(&payload).await;
    let (server_2, _m2) = node_serving(&payload).await;

    let nodes = vec![
        create_node_endpoint("node-1", &server_1.url()),
        create_node_endpoint("node-2", &server_2.url()),
    ];

    let engine = QuorumEngine::default();
    let policy = poll_policy(2, 2, 2);

    // The engine keeps no state between polls; a second poll behaves like
    // the first.
    for _ in 0..2 {
        let decision = engine.resolve(&create_test_request(), &nodes, &policy).await.unwrap();
        assert_eq!(decision.agreement_count, 2);
    }
}
