//! Moka near-cache
//!
//! Per-process local tier: one `moka::future::Cache` per namespace, all built
//! from the same [`LocalPolicy`].
//!
//! ## Policy mapping
//!
//! | Policy | Moka |
//! |--------|------|
//! | `maximum_size` | `max_capacity` |
//! | `expire_after_write` | `time_to_live` |
//! | `expire_after_access` | `time_to_idle` |
//! | `initial_capacity` | `initial_capacity` |
//! | `refresh_after_write` | reported through [`LocalHit::needs_refresh`] |
//!
//! ## Example
//!
//! ```ignore
//! use tiercache_providers::MokaLocalCache;
//! use tiercache_domain::LocalPolicy;
//!
//! let local = MokaLocalCache::new(LocalPolicy::from_settings(10_000, 0, 600_000, 0, 0));
//! ```

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use std::time::Instant;
use tiercache_domain::ports::{LocalCache, LocalHit};
use tiercache_domain::{CacheKey, CacheValue, LocalPolicy};
use tracing::debug;

#[derive(Clone)]
struct LocalEntry {
    value: CacheValue,
    written_at: Instant,
}

type Table = Cache<CacheKey, LocalEntry>;

/// Moka-based local cache
///
/// Tables are created on first write through the map's entry API, so
/// concurrent first writers to a namespace share one table.
pub struct MokaLocalCache {
    tables: DashMap<String, Table>,
    policy: LocalPolicy,
}

impl MokaLocalCache {
    pub fn new(policy: LocalPolicy) -> Self {
        Self {
            tables: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &LocalPolicy {
        &self.policy
    }

    fn build_table(&self) -> Table {
        let mut builder = Cache::builder();
        if let Some(max) = self.policy.maximum_size {
            builder = builder.max_capacity(max);
        }
        if let Some(ttl) = self.policy.expire_after_write {
            builder = builder.time_to_live(ttl);
        }
        if let Some(tti) = self.policy.expire_after_access {
            builder = builder.time_to_idle(tti);
        }
        if let Some(capacity) = self.policy.initial_capacity {
            builder = builder.initial_capacity(capacity);
        }
        builder.build()
    }

    // Tables are cloned out of the map so no shard lock is held across an await
    fn table(&self, namespace: &str) -> Option<Table> {
        self.tables.get(namespace).map(|table| table.value().clone())
    }

    fn table_or_create(&self, namespace: &str) -> Table {
        if let Some(table) = self.table(namespace) {
            return table;
        }
        self.tables
            .entry(namespace.to_string())
            .or_insert_with(|| {
                debug!(namespace, "Creating local cache table");
                self.build_table()
            })
            .value()
            .clone()
    }

    fn is_stale(&self, entry: &LocalEntry) -> bool {
        self.policy
            .refresh_after_write
            .is_some_and(|window| entry.written_at.elapsed() >= window)
    }
}

impl Default for MokaLocalCache {
    fn default() -> Self {
        Self::new(LocalPolicy::default())
    }
}

#[async_trait]
impl LocalCache for MokaLocalCache {
    async fn get(&self, namespace: &str, key: &CacheKey) -> Option<LocalHit> {
        let entry = self.table(namespace)?.get(key).await?;
        let needs_refresh = self.is_stale(&entry);
        Some(LocalHit {
            value: entry.value,
            needs_refresh,
        })
    }

    async fn put(&self, namespace: &str, key: &CacheKey, value: CacheValue) {
        let entry = LocalEntry {
            value,
            written_at: Instant::now(),
        };
        self.table_or_create(namespace)
            .insert(key.clone(), entry)
            .await;
    }

    async fn invalidate(&self, namespace: &str, key: &CacheKey) {
        if let Some(table) = self.table(namespace) {
            table.invalidate(key).await;
        }
    }

    async fn invalidate_all(&self, namespace: &str) {
        if let Some((_, table)) = self.tables.remove(namespace) {
            table.invalidate_all();
            debug!(namespace, "Dropped local cache table");
        }
    }

    async fn entry_count(&self, namespace: &str) -> u64 {
        match self.table(namespace) {
            Some(table) => {
                table.run_pending_tasks().await;
                table.entry_count()
            }
            None => 0,
        }
    }

    fn namespaces(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.key().clone()).collect()
    }

    fn provider_name(&self) -> &str {
        "moka"
    }
}

impl std::fmt::Debug for MokaLocalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaLocalCache")
            .field("policy", &self.policy)
            .field("namespaces", &self.tables.len())
            .finish()
    }
}
