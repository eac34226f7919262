//! In-memory remote backend
//!
//! Implements the full [`RemoteBackend`] contract inside the process:
//! per-entry TTLs, namespace fallback expiry set by the first write, and
//! BackendUnavailable on demand. Time comes from a [`Clock`], so expiry can
//! be driven with a [`ManualClock`](super::ManualClock).
//!
//! Share one instance between several coordinators to simulate a fleet.
//!
//! ## Example
//!
//! ```ignore
//! use tiercache_providers::{InMemoryRemoteBackend, ManualClock};
//! use std::sync::Arc;
//!
//! let clock = ManualClock::new();
//! let backend = InMemoryRemoteBackend::new().with_clock(Arc::new(clock.clone()));
//! ```

use super::clock::{Clock, SystemClock, expires_at};
use super::envelope::is_expired;
use super::{validate_keyed, validate_lookup};
use crate::codec::IdentityCodec;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tiercache_domain::constants::DEFAULT_NAMESPACE_TTL_SECS;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{RemoteBackend, ValueCodec};
use tiercache_domain::value_objects::validate_namespaces;
use tiercache_domain::{CacheKey, CacheValue};
use tracing::debug;

struct StoredEntry {
    bytes: Vec<u8>,
    expires_at: Option<u64>,
}

struct NamespaceState {
    entries: HashMap<CacheKey, StoredEntry>,
    expires_at: u64,
}

impl NamespaceState {
    fn is_expired(&self, now: u64) -> bool {
        self.expires_at <= now
    }
}

/// In-process remote backend
pub struct InMemoryRemoteBackend {
    namespaces: DashMap<String, NamespaceState>,
    clock: Arc<dyn Clock>,
    codec: Arc<dyn ValueCodec>,
    namespace_ttl: Duration,
    available: AtomicBool,
    first_write_batches: AtomicU64,
    get_calls: AtomicU64,
}

impl InMemoryRemoteBackend {
    pub fn new() -> Self {
        Self {
            namespaces: DashMap::new(),
            clock: Arc::new(SystemClock),
            codec: Arc::new(IdentityCodec),
            namespace_ttl: Duration::from_secs(DEFAULT_NAMESPACE_TTL_SECS),
            available: AtomicBool::new(true),
            first_write_batches: AtomicU64::new(0),
            get_calls: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn ValueCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Fallback horizon applied to a namespace by its first write
    #[must_use]
    pub fn with_namespace_ttl(mut self, ttl: Duration) -> Self {
        self.namespace_ttl = ttl;
        self
    }

    /// Fault switch: while unavailable every call fails with BackendUnavailable
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of first-write batches (entry + namespace expiry) performed
    pub fn first_write_batches(&self) -> u64 {
        self.first_write_batches.load(Ordering::SeqCst)
    }

    /// Number of `get` calls served, hits and misses alike
    pub fn get_calls(&self) -> u64 {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Time left before `namespace` expires as a whole
    pub fn namespace_expiry(&self, namespace: &str) -> Option<Duration> {
        let now = self.clock.now_millis();
        self.namespaces
            .get(namespace)
            .filter(|state| !state.is_expired(now))
            .map(|state| Duration::from_millis(state.expires_at - now))
    }

    /// Time left before one entry expires; `None` when absent or without TTL
    pub fn entry_expiry(&self, namespace: &str, key: &CacheKey) -> Option<Duration> {
        let now = self.clock.now_millis();
        let state = self.namespaces.get(namespace)?;
        let at = state.entries.get(key)?.expires_at?;
        (at > now).then(|| Duration::from_millis(at - now))
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::backend_unavailable("In-memory backend marked unavailable"))
        }
    }

    fn namespace_ttl_millis(&self) -> u64 {
        u64::try_from(self.namespace_ttl.as_millis()).unwrap_or(u64::MAX)
    }

    fn purge_if_expired(&self, namespace: &str, now: u64) {
        if self
            .namespaces
            .remove_if(namespace, |_, state| state.is_expired(now))
            .is_some()
        {
            debug!(namespace, "In-memory namespace expired");
        }
    }
}

impl Default for InMemoryRemoteBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteBackend for InMemoryRemoteBackend {
    async fn get(&self, namespace: &str, key: &CacheKey) -> Result<Option<CacheValue>> {
        validate_lookup(namespace, key)?;
        self.check_available()?;
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        let now = self.clock.now_millis();
        self.purge_if_expired(namespace, now);

        let bytes = {
            let Some(mut state) = self.namespaces.get_mut(namespace) else {
                return Ok(None);
            };
            let expired = match state.entries.get(key) {
                Some(entry) => is_expired(entry.expires_at, now),
                None => return Ok(None),
            };
            if expired {
                state.entries.remove(key);
                return Ok(None);
            }
            state.entries.get(key).map(|entry| entry.bytes.clone())
        };

        bytes
            .map(|stored| self.codec.decode(&stored).map(CacheValue::from))
            .transpose()
    }

    async fn put(
        &self,
        namespaces: &[String],
        key: &CacheKey,
        value: &CacheValue,
        ttl: Duration,
    ) -> Result<()> {
        validate_keyed(namespaces, key)?;
        self.check_available()?;

        let bytes = self.codec.encode(value.as_bytes())?;
        let now = self.clock.now_millis();
        let entry_expiry = expires_at(now, ttl);

        for namespace in namespaces {
            let stored = StoredEntry {
                bytes: bytes.clone(),
                expires_at: entry_expiry,
            };
            match self.namespaces.entry(namespace.clone()) {
                Entry::Occupied(mut occupied) if !occupied.get().is_expired(now) => {
                    occupied.get_mut().entries.insert(key.clone(), stored);
                }
                vacant_or_expired => {
                    let mut state = NamespaceState {
                        entries: HashMap::new(),
                        expires_at: now.saturating_add(self.namespace_ttl_millis()),
                    };
                    state.entries.insert(key.clone(), stored);
                    vacant_or_expired.insert(state);
                    self.first_write_batches.fetch_add(1, Ordering::SeqCst);
                    debug!(namespace = %namespace, "First write set namespace expiry");
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, namespaces: &[String], key: &CacheKey) -> Result<()> {
        validate_keyed(namespaces, key)?;
        self.check_available()?;

        for namespace in namespaces {
            if let Some(mut state) = self.namespaces.get_mut(namespace) {
                state.entries.remove(key);
            }
        }
        Ok(())
    }

    async fn delete_all(&self, namespaces: &[String]) -> Result<()> {
        validate_namespaces(namespaces)?;
        self.check_available()?;

        for namespace in namespaces {
            self.namespaces.remove(namespace);
        }
        Ok(())
    }

    async fn exists(&self, namespace: &str) -> Result<bool> {
        self.check_available()?;
        self.purge_if_expired(namespace, self.clock.now_millis());
        Ok(self.namespaces.contains_key(namespace))
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}

impl std::fmt::Debug for InMemoryRemoteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRemoteBackend")
            .field("namespaces", &self.namespaces.len())
            .field("codec", &self.codec.name())
            .field("namespace_ttl", &self.namespace_ttl)
            .field("available", &self.available.load(Ordering::Relaxed))
            .finish()
    }
}
