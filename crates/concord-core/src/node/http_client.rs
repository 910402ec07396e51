use reqwest::{Client, ClientBuilder};
use std::{sync::Arc, time::Duration};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::node::NodeError;

/// Maximum number of response-body bytes echoed back in error messages.
const ERROR_BODY_LIMIT: usize = 256;

/// Configuration for HTTP client concurrency and timeout behavior.
///
/// Controls semaphore-based concurrency limiting with adaptive timeouts
/// based on permit availability.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum number of concurrent HTTP requests allowed
    pub concurrent_limit: usize,
    /// Permit acquisition timeout in milliseconds under normal load
    pub permit_timeout_ms: u64,
    /// Permit acquisition timeout in milliseconds when permits are scarce
    pub permit_timeout_scarce_ms: u64,
    /// Number of available permits below which they are considered scarce
    pub scarce_permit_threshold: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            concurrent_limit: 1000,
            permit_timeout_ms: 500,
            permit_timeout_scarce_ms: 200,
            scarce_permit_threshold: 100,
        }
    }
}

/// HTTP client with semaphore-based concurrency control.
///
/// Shared by every node endpoint so that one connection pool serves the
/// whole fan-out. The transport makes exactly one attempt per call: a failed
/// call surfaces to the quorum layer as dissent and is never retried here.
pub struct HttpClient {
    client: Client,
    concurrent_limit: Arc<Semaphore>,
    config: HttpClientConfig,
}

/// RAII guard ensuring semaphore permits are always released.
///
/// Uses [`OwnedSemaphorePermit`] which owns an `Arc` to the semaphore,
/// making it safe to hold across async boundaries.
struct PermitGuard {
    _permit: OwnedSemaphorePermit,
    semaphore: Arc<Semaphore>,
}

impl PermitGuard {
    fn new(permit: OwnedSemaphorePermit, semaphore: Arc<Semaphore>) -> Self {
        Self { _permit: permit, semaphore }
    }

    fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Drop for PermitGuard {
    fn drop(&mut self) {
        tracing::trace!(
            available_permits = self.semaphore.available_permits(),
            "permit guard dropped"
        );
    }
}

// Note: Default is intentionally NOT implemented because HttpClient::new() can fail.
// Callers should use HttpClient::new() or HttpClient::with_config() explicitly
// and handle the Result.

impl HttpClient {
    /// Creates a new HTTP client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, NodeError> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Creates a new HTTP client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn with_config(config: HttpClientConfig) -> Result<Self, NodeError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(100)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(45))
            .http2_adaptive_window(true)
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent("concord/0.1.0")
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                NodeError::ConnectionFailed(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self {
            client,
            concurrent_limit: Arc::new(Semaphore::new(config.concurrent_limit)),
            config,
        })
    }

    /// Sanitizes network errors to prevent information disclosure.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_decode() {
            "response decode error".to_string()
        } else if error.is_redirect() {
            "too many redirects".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// Sends an HTTP POST request with semaphore-based concurrency control.
    ///
    /// # Errors
    ///
    /// - [`NodeError::Timeout`] if permit acquisition or the request times out
    /// - [`NodeError::ConcurrencyLimit`] if the semaphore is closed
    /// - [`NodeError::HttpError`] for non-success HTTP status codes
    /// - [`NodeError::Network`] for network-related failures
    pub async fn send_request(
        &self,
        url: &str,
        body: bytes::Bytes,
        timeout: Duration,
    ) -> Result<bytes::Bytes, NodeError> {
        let permit_timeout =
            if self.concurrent_limit.available_permits() < self.config.scarce_permit_threshold {
                Duration::from_millis(self.config.permit_timeout_scarce_ms)
            } else {
                Duration::from_millis(self.config.permit_timeout_ms)
            };

        let permit = tokio::time::timeout(
            permit_timeout,
            Arc::clone(&self.concurrent_limit).acquire_owned(),
        )
        .await
        .map_err(|_| {
            tracing::warn!(
                url = url,
                available_permits = self.concurrent_limit.available_permits(),
                "http client semaphore acquisition timeout"
            );
            NodeError::Timeout
        })?
        .map_err(|_| {
            tracing::warn!(
                url = url,
                available_permits = self.concurrent_limit.available_permits(),
                "http client concurrency limit reached"
            );
            NodeError::ConcurrencyLimit(url.to_string())
        })?;

        let permit_guard = PermitGuard::new(permit, self.concurrent_limit.clone());

        tracing::trace!(
            available_permits = permit_guard.available_permits(),
            "http request started"
        );

        let result = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .timeout(timeout)
            .send()
            .await;

        match result {
            Ok(response) => {
                if response.status().is_success() {
                    let result = response.bytes().await.map_err(NodeError::Network);
                    tracing::trace!(
                        available_permits = permit_guard.available_permits(),
                        "http request completed"
                    );
                    return result;
                }

                let status = response.status().as_u16();
                let raw_text = response.text().await.unwrap_or_default();
                tracing::trace!(
                    status = status,
                    available_permits = permit_guard.available_permits(),
                    "http request failed"
                );
                Err(NodeError::HttpError(status, truncate_error_body(raw_text)))
            }
            Err(e) => {
                tracing::trace!(
                    available_permits = permit_guard.available_permits(),
                    "http request error"
                );
                if e.is_timeout() {
                    return Err(NodeError::Timeout);
                }
                Err(NodeError::ConnectionFailed(Self::sanitize_network_error(&e)))
            }
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.concurrent_limit.available_permits()
    }
}

/// Caps an error body for inclusion in a [`NodeError::HttpError`] message.
///
/// The cut lands on a char boundary so multi-byte payloads never panic.
fn truncate_error_body(raw_text: String) -> String {
    if raw_text.len() <= ERROR_BODY_LIMIT {
        return raw_text;
    }
    let mut cut = ERROR_BODY_LIMIT;
    while !raw_text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... (truncated)", &raw_text[..cut])
}
