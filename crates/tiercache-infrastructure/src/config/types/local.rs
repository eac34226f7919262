//! Local tier configuration types

use serde::{Deserialize, Serialize};
use tiercache_domain::LocalPolicy;

/// Local tier eviction policy; zero disables a dimension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Maximum entries per namespace table
    pub maximum_size: u64,

    /// Expire entries this many milliseconds after the last access
    pub expire_after_access_ms: u64,

    /// Expire entries this many milliseconds after they were written
    pub expire_after_write_ms: u64,

    /// Re-fetch entries older than this many milliseconds in the background
    pub refresh_after_write_ms: u64,

    /// Initial table capacity hint
    pub initial_capacity: usize,
}

impl LocalConfig {
    pub fn policy(&self) -> LocalPolicy {
        LocalPolicy::from_settings(
            self.maximum_size,
            self.expire_after_write_ms,
            self.expire_after_access_ms,
            self.refresh_after_write_ms,
            self.initial_capacity,
        )
    }
}
