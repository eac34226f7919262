//! Invalidation bus configuration types

use crate::constants::TOKIO_BUS_DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use tiercache_domain::constants::DEFAULT_INVALIDATION_CHANNEL;

/// Invalidation transports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusProvider {
    /// Redis pub/sub on the remote tier's server
    #[default]
    Redis,
    /// NATS subject
    Nats,
    /// In-process broadcast
    Tokio,
    /// No transport (single node)
    Null,
}

/// Invalidation bus configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvalidationConfig {
    /// Transport
    pub provider: BusProvider,

    /// Channel or subject shared by the fleet
    pub channel: String,

    /// NATS server URL (nats provider)
    pub nats_url: Option<String>,

    /// Broadcast buffer (tokio provider)
    pub capacity: usize,
}

impl Default for InvalidationConfig {
    fn default() -> Self {
        Self {
            provider: BusProvider::default(),
            channel: DEFAULT_INVALIDATION_CHANNEL.to_string(),
            nats_url: None,
            capacity: TOKIO_BUS_DEFAULT_CAPACITY,
        }
    }
}
