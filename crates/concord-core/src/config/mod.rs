//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `CONCORD_CONFIG` env var
//! 3. **Environment variables**: `CONCORD_*` env vars override specific fields
//!
//! # Configuration Sections
//!
//! - [`EngineConfig`]: Poll engine concurrency settings
//! - [`NodeProvider`]: JSON-RPC node definitions queried during polls
//! - [`QuorumPolicy`]: Default voting rules applied to polls
//! - [`TransportConfig`]: HTTP client pool and backpressure settings
//! - [`LoggingConfig`]: Log level and format
//!
//! # Validation
//!
//! Configuration is validated at load time. Invalid configurations (e.g.,
//! an empty node pool, malformed URLs) return errors rather than failing
//! silently.
//!
//! # Example
//!
//! ```toml
//! [engine]
//! max_concurrent_polls = 100
//!
//! [quorum]
//! node_count = 3
//! min_agreement = 2
//!
//! [[pool.nodes]]
//! name = "node-a"
//! url = "https://node-a.example.com"
//! ```

use crate::{node::HttpClientConfig, quorum::QuorumPolicy, types::NodeConfig};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, sync::Arc, time::Duration};

/// Poll engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of polls allowed in flight at once. Defaults to `100`.
    #[serde(default = "default_max_concurrent_polls")]
    pub max_concurrent_polls: usize,
}

fn default_max_concurrent_polls() -> usize {
    100
}

/// Configuration for a single JSON-RPC node.
///
/// Nodes are queried in the order they appear in the pool; a poll takes the
/// first `node_count` of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeProvider {
    /// Human-readable identifier for this node (e.g., "mainnet-1").
    pub name: String,

    /// HTTP(S) endpoint URL. Must start with `http` or `https`.
    pub url: String,
}

/// Container for the pool of nodes available to polls.
///
/// Must contain at least one node for the application to function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodePoolConfig {
    /// List of configured nodes. Cannot be empty.
    pub nodes: Vec<NodeProvider>,
}

/// HTTP transport pool and backpressure settings.
///
/// Mirrors [`HttpClientConfig`] so the transport layer stays free of
/// serialization concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Maximum number of concurrent HTTP requests. Defaults to `1000`.
    #[serde(default = "default_concurrent_limit")]
    pub concurrent_limit: usize,

    /// Permit acquisition timeout in milliseconds under normal load. Defaults to `500`.
    #[serde(default = "default_permit_timeout_ms")]
    pub permit_timeout_ms: u64,

    /// Permit acquisition timeout in milliseconds when permits are scarce. Defaults to `200`.
    #[serde(default = "default_permit_timeout_scarce_ms")]
    pub permit_timeout_scarce_ms: u64,

    /// Number of available permits below which they are considered scarce. Defaults to `100`.
    #[serde(default = "default_scarce_permit_threshold")]
    pub scarce_permit_threshold: usize,
}

fn default_concurrent_limit() -> usize {
    1000
}

fn default_permit_timeout_ms() -> u64 {
    500
}

fn default_permit_timeout_scarce_ms() -> u64 {
    200
}

fn default_scarce_permit_threshold() -> usize {
    100
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error"). Defaults to `"info"`.
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    pub format: String,
}

/// Root application configuration containing all subsystem settings.
///
/// This is the primary configuration structure loaded from TOML files and
/// environment variables. Configuration is loaded with the `CONCORD_` prefix
/// for environment overrides using `__` as a separator.
///
/// # Example
///
/// ```toml
/// environment = "production"
///
/// [quorum]
/// node_count = 5
/// min_agreement = 0.67
///
/// [[pool.nodes]]
/// name = "mainnet-1"
/// url = "https://rpc.example.com"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment (e.g., "development", "production"). Defaults to `"development"`.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Poll engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Node pool configuration.
    #[serde(default)]
    pub pool: NodePoolConfig,

    /// Default quorum policy for polls.
    #[serde(default)]
    pub quorum: QuorumPolicy,

    /// HTTP transport configuration.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_concurrent_polls: 100 }
    }
}

impl Default for NodePoolConfig {
    fn default() -> Self {
        Self {
            nodes: vec![
                NodeProvider {
                    name: "node-a".to_string(),
                    url: "https://node-a.example.com".to_string(),
                },
                NodeProvider {
                    name: "node-b".to_string(),
                    url: "https://node-b.example.com".to_string(),
                },
                NodeProvider {
                    name: "node-c".to_string(),
                    url: "https://node-c.example.com".to_string(),
                },
            ],
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            concurrent_limit: 1000,
            permit_timeout_ms: 500,
            permit_timeout_scarce_ms: 200,
            scarce_permit_threshold: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            engine: EngineConfig::default(),
            pool: NodePoolConfig::default(),
            quorum: QuorumPolicy::default(),
            transport: TransportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TransportConfig {
    /// Converts to the transport layer's own [`HttpClientConfig`].
    #[must_use]
    pub fn to_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            concurrent_limit: self.concurrent_limit,
            permit_timeout_ms: self.permit_timeout_ms,
            permit_timeout_scarce_ms: self.permit_timeout_scarce_ms,
            scarce_permit_threshold: self.scarce_permit_threshold,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `CONCORD__` prefix can override any configuration value.
    /// Use `__` as a separator for nested fields (e.g., `CONCORD__QUORUM__NODE_COUNT=5`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("environment", "development")?
            .set_default("engine.max_concurrent_polls", 100)?
            .set_default("quorum.node_count", 3)?
            .set_default("quorum.min_responses", 2)?
            .set_default("quorum.per_node_timeout_ms", 5000)?
            .set_default("quorum.global_timeout_ms", 10_000)?
            .set_default("quorum.order_insensitive_arrays", false)?
            .set_default("transport.concurrent_limit", 1000)?
            .set_default("transport.permit_timeout_ms", 500)?
            .set_default("transport.permit_timeout_scarce_ms", 200)?
            .set_default("transport.scarce_permit_threshold", 100)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("CONCORD").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/config.toml` with fallback to defaults.
    ///
    /// The config file path can be overridden using the `CONCORD_CONFIG` environment variable.
    /// Environment variable overrides are supported via the `CONCORD_` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONCORD_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Converts pool entries to the runtime [`NodeConfig`] format used by
    /// node endpoints.
    #[must_use]
    pub fn node_configs(&self) -> Vec<NodeConfig> {
        self.pool
            .nodes
            .iter()
            .map(|n| NodeConfig { name: Arc::from(n.name.as_str()), url: n.url.clone() })
            .collect()
    }

    /// Returns the maximum number of polls allowed in flight at once.
    #[must_use]
    pub fn max_concurrent_polls(&self) -> usize {
        self.engine.max_concurrent_polls
    }

    /// Returns the default per-node call timeout as a [`Duration`].
    #[must_use]
    pub fn per_node_timeout(&self) -> Duration {
        self.quorum.per_node_timeout()
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// Checks include:
    /// - At least one node is configured and node names are unique
    /// - All URLs are properly formatted
    /// - The quorum policy is internally consistent
    /// - All numeric values are greater than zero where required
    /// - Logging format is either `"json"` or `"pretty"`
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.pool.nodes.is_empty() {
            return Err("No nodes configured".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for node in &self.pool.nodes {
            if node.url.is_empty() {
                return Err(format!("Empty URL for node: {}", node.name));
            }
            if !node.url.starts_with("http") {
                return Err(format!("Invalid URL for node {}: {}", node.name, node.url));
            }
            if !seen.insert(node.name.as_str()) {
                return Err(format!("Duplicate node name: {}", node.name));
            }
        }

        self.quorum.validate()?;

        if self.engine.max_concurrent_polls == 0 {
            return Err("Max concurrent polls must be greater than 0".to_string());
        }

        if self.transport.concurrent_limit == 0 {
            return Err("Transport concurrent limit must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
