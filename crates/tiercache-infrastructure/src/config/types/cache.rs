//! Cache configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tiercache_domain::constants::DEFAULT_NAMESPACE_TTL_SECS;

/// Cache switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache enabled; when false the interceptor only runs business calls
    pub enabled: bool,

    /// Enable the local tier and cross-node invalidation
    pub second_tier_enabled: bool,

    /// Fallback lifetime of a remote namespace, set on its first write
    pub namespace_ttl_secs: u64,

    /// Per-entry TTL used when an operation does not set one (0 = none)
    pub default_entry_ttl_secs: u64,
}

impl CacheConfig {
    pub fn namespace_ttl(&self) -> Duration {
        Duration::from_secs(self.namespace_ttl_secs)
    }

    pub fn default_entry_ttl(&self) -> Duration {
        Duration::from_secs(self.default_entry_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            second_tier_enabled: false,
            namespace_ttl_secs: DEFAULT_NAMESPACE_TTL_SECS,
            default_entry_ttl_secs: 0,
        }
    }
}
