//! Local Cache Port
//!
//! Per-process near-cache, one bounded table per namespace.
//!
//! ## Contract
//!
//! - A namespace table is created by the first `put` into it. Concurrent
//!   first writers end up sharing one table.
//! - `get` on an unknown namespace or key is a miss, never an error.
//! - `invalidate` on an unknown namespace is a no-op.
//! - `invalidate_all` drops every entry and the table itself.
//! - All operations are safe to call concurrently from request tasks and
//!   from the invalidation delivery task.

use crate::value_objects::{CacheKey, CacheValue};
use async_trait::async_trait;

/// Result of a local lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHit {
    /// Cached payload
    pub value: CacheValue,
    /// The entry outlived the refresh-after-write window and should be
    /// re-fetched from the remote tier in the background
    pub needs_refresh: bool,
}

/// Local (near) cache port
#[async_trait]
pub trait LocalCache: Send + Sync + std::fmt::Debug {
    /// Look up `key` in `namespace`
    async fn get(&self, namespace: &str, key: &CacheKey) -> Option<LocalHit>;

    /// Store `value`, creating the namespace table on first use
    async fn put(&self, namespace: &str, key: &CacheKey, value: CacheValue);

    /// Remove one entry
    async fn invalidate(&self, namespace: &str, key: &CacheKey);

    /// Remove the whole namespace table
    async fn invalidate_all(&self, namespace: &str);

    /// Number of live entries in `namespace` (0 when unknown)
    async fn entry_count(&self, namespace: &str) -> u64;

    /// Namespaces that currently own a table
    fn namespaces(&self) -> Vec<String>;

    /// Provider identifier (e.g., "moka")
    fn provider_name(&self) -> &str;
}
