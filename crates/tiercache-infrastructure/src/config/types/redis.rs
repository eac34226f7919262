//! Redis configuration types

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tiercache_providers::{RedisBackendConfig, RedisEndpoint};

/// Remote tier connection settings
///
/// Either `host` (single server) or `cluster_nodes` must be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Single server host
    pub host: Option<String>,

    /// Single server port
    pub port: u16,

    /// Comma separated `host:port` seed nodes; takes precedence over `host`
    pub cluster_nodes: Option<String>,

    /// Password for single server and cluster
    pub password: Option<String>,

    /// Database index (single server)
    pub database: i64,

    /// Multiplexed connections
    pub pool_size: usize,

    /// Connections opened at startup
    pub min_idle: usize,

    /// Per-command timeout in milliseconds
    pub timeout_ms: u64,

    /// Gzip values before they reach Redis
    pub use_compression: bool,
}

impl RedisConfig {
    /// Seed nodes parsed from `cluster_nodes`, blanks dropped
    pub fn cluster_node_list(&self) -> Vec<String> {
        self.cluster_nodes
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|node| !node.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    /// Endpoint described by this section, `None` when nothing is set
    pub fn endpoint(&self) -> Option<RedisEndpoint> {
        let nodes = self.cluster_node_list();
        if !nodes.is_empty() {
            return Some(RedisEndpoint::Cluster(nodes));
        }
        self.host.as_ref().map(|host| RedisEndpoint::Single {
            host: host.clone(),
            port: self.port,
        })
    }

    /// URL for pub/sub connections: the single server or the first seed node
    pub fn pubsub_url(&self) -> Option<String> {
        match self.endpoint()? {
            RedisEndpoint::Single { host, port } => Some(RedisBackendConfig::single_url(
                &host,
                port,
                self.password.as_deref(),
                self.database,
            )),
            RedisEndpoint::Cluster(nodes) => nodes.first().map(|node| match &self.password {
                Some(password) => format!("redis://:{password}@{node}"),
                None => format!("redis://{node}"),
            }),
        }
    }

    /// Backend settings for this section
    pub fn backend_config(&self, namespace_ttl: Duration) -> Option<RedisBackendConfig> {
        let endpoint = self.endpoint()?;
        let mut config = match endpoint {
            RedisEndpoint::Single { host, port } => RedisBackendConfig::single(host, port),
            RedisEndpoint::Cluster(nodes) => RedisBackendConfig::cluster(nodes),
        };
        config.password = self.password.clone();
        config.database = self.database;
        config.pool_size = self.pool_size;
        config.min_idle = self.min_idle;
        config.timeout = Duration::from_millis(self.timeout_ms);
        config.namespace_ttl = namespace_ttl;
        Some(config)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: REDIS_DEFAULT_PORT,
            cluster_nodes: None,
            password: None,
            database: 0,
            pool_size: REDIS_DEFAULT_POOL_SIZE,
            min_idle: REDIS_DEFAULT_MIN_IDLE,
            timeout_ms: REDIS_DEFAULT_TIMEOUT_MS,
            use_compression: false,
        }
    }
}
