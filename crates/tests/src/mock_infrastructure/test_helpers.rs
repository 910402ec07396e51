//! Test Helper Functions and Utilities
//!
//! Common helpers for poll fixtures, tracing setup, and peers that are slow
//! or silent on purpose.

use serde_json::{json, Value};
use std::time::Duration;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

/// Initializes tracing output for tests.
///
/// Respects `RUST_LOG`; safe to call from every test, repeated calls are
/// no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates a balances-style result payload.
#[must_use]
pub fn balances_result(balances: &[&str], milestone: u64) -> Value {
    json!({
        "balances": balances,
        "milestoneIndex": milestone,
        "references": []
    })
}

/// Creates a full JSON-RPC success envelope around a result payload.
#[must_use]
pub fn success_envelope(result: &Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result
    })
}

/// Starts a server that accepts connections and never replies.
///
/// Returns a URL to point a node endpoint at. Accepted sockets are held open
/// so the caller's deadline, not a connection error, ends the exchange.
pub async fn unresponsive_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{addr}")
}

/// Starts a server that reads the request, waits for `delay`, then sends a
/// valid JSON-RPC reply carrying `result`.
///
/// Useful for proving that replies arriving after a deadline no longer
/// influence a poll.
pub async fn delayed_server(delay: Duration, result: Value) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let result = result.clone();
            tokio::spawn(async move {
                let mut buffer = [0u8; 4096];
                let _ = socket.read(&mut buffer).await;
                tokio::time::sleep(delay).await;

                let body = success_envelope(&result).to_string();
                let reply = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
            });
        }
    });

    format!("http://{addr}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balances_result_shape() {
        let result = balances_result(&["114544444", "0"], 42);
        assert_eq!(result["balances"].as_array().unwrap().len(), 2);
        assert_eq!(result["milestoneIndex"], 42);
    }

    #[test]
    fn test_success_envelope_wraps_result() {
        let envelope = success_envelope(&json!({"x": 1}));
        assert_eq!(envelope["jsonrpc"], "2.0");
        assert_eq!(envelope["result"]["x"], 1);
        assert!(envelope.get("error").is_none());
    }

    #[tokio::test]
    async fn test_unresponsive_server_accepts_connections() {
        let url = unresponsive_server().await;
        let host = url.trim_start_matches("http://").to_string();
        let connected = tokio::net::TcpStream::connect(&host).await;
        assert!(connected.is_ok());
    }
}
