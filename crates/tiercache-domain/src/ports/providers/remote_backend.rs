//! Remote Backend Port
//!
//! Shared namespaced key-value store, the source of truth visible to every
//! node.
//!
//! ## Contract
//!
//! | Operation | Behaviour |
//! |-----------|-----------|
//! | `get` | Value or `None` on miss/expiry |
//! | `put` | Writes the entry with its own TTL in every namespace. A namespace's first write also sets the namespace-wide fallback expiry, in the same atomic batch |
//! | `delete` | Removes one key from every namespace |
//! | `delete_all` | Drops every listed namespace entirely |
//!
//! Empty namespace lists, blank namespace names and empty keys fail with
//! [`Error::InvalidArgument`](crate::Error::InvalidArgument). Transport or
//! store failures are [`Error::BackendUnavailable`](crate::Error::BackendUnavailable),
//! never a silent `None`.

use crate::error::Result;
use crate::value_objects::{CacheKey, CacheValue};
use async_trait::async_trait;
use std::time::Duration;

/// Remote (shared) backend port
#[async_trait]
pub trait RemoteBackend: Send + Sync + std::fmt::Debug {
    /// Read one entry
    async fn get(&self, namespace: &str, key: &CacheKey) -> Result<Option<CacheValue>>;

    /// Write one entry into every namespace
    ///
    /// `ttl` of zero stores the entry without its own expiry; it still dies
    /// with its namespace.
    async fn put(
        &self,
        namespaces: &[String],
        key: &CacheKey,
        value: &CacheValue,
        ttl: Duration,
    ) -> Result<()>;

    /// Remove one key from every namespace
    async fn delete(&self, namespaces: &[String], key: &CacheKey) -> Result<()>;

    /// Drop every namespace with all its entries
    async fn delete_all(&self, namespaces: &[String]) -> Result<()>;

    /// Whether `namespace` currently exists in the store
    async fn exists(&self, namespace: &str) -> Result<bool>;

    /// Provider identifier (e.g., "redis", "memory")
    fn provider_name(&self) -> &str;
}
