use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Eviction policy shared by every local namespace table
///
/// `None` disables a dimension. Built once per process from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPolicy {
    /// Maximum number of entries per namespace table
    pub maximum_size: Option<u64>,
    /// Entries expire this long after they were written
    pub expire_after_write: Option<Duration>,
    /// Entries expire this long after their last read or write
    pub expire_after_access: Option<Duration>,
    /// Entries older than this are served but re-fetched from the remote tier
    pub refresh_after_write: Option<Duration>,
    /// Initial table capacity hint
    pub initial_capacity: Option<usize>,
}

impl LocalPolicy {
    /// Build a policy from millisecond/count settings where zero disables
    pub fn from_settings(
        maximum_size: u64,
        expire_after_write_ms: u64,
        expire_after_access_ms: u64,
        refresh_after_write_ms: u64,
        initial_capacity: usize,
    ) -> Self {
        let millis = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));
        Self {
            maximum_size: (maximum_size > 0).then_some(maximum_size),
            expire_after_write: millis(expire_after_write_ms),
            expire_after_access: millis(expire_after_access_ms),
            refresh_after_write: millis(refresh_after_write_ms),
            initial_capacity: (initial_capacity > 0).then_some(initial_capacity),
        }
    }
}
