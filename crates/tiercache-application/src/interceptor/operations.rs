//! Cache operation descriptors
//!
//! Each descriptor is registered once per cached business operation and
//! carries what an annotation would: namespaces, TTL, write mode, key
//! strategy and a key builder over the call's arguments (and, for put and
//! evict, its result).

use crate::coordinator::WriteMode;
use std::fmt;
use std::time::Duration;
use tiercache_domain::{CacheKey, KeyComponents, KeyStrategy};

type ArgsKeyBuilder<A> = Box<dyn Fn(&A) -> KeyComponents + Send + Sync>;
type ResultKeyBuilder<A, T> = Box<dyn Fn(&A, &T) -> KeyComponents + Send + Sync>;

/// Read-through operation: serve from cache, compute and store on a miss
pub struct Cacheable<A> {
    pub(crate) namespace: String,
    pub(crate) ttl: Duration,
    pub(crate) mode: WriteMode,
    pub(crate) strategy: KeyStrategy,
    key_builder: ArgsKeyBuilder<A>,
}

impl<A> Cacheable<A> {
    pub fn new<S, F>(namespace: S, key_builder: F) -> Self
    where
        S: Into<String>,
        F: Fn(&A) -> KeyComponents + Send + Sync + 'static,
    {
        Self {
            namespace: namespace.into(),
            ttl: Duration::ZERO,
            mode: WriteMode::Sync,
            strategy: KeyStrategy::default(),
            key_builder: Box::new(key_builder),
        }
    }

    /// Per-entry TTL for stored results (zero: namespace lifetime only)
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: KeyStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key_for(&self, args: &A) -> CacheKey {
        self.strategy.generate(&(self.key_builder)(args))
    }
}

impl<A> fmt::Debug for Cacheable<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cacheable")
            .field("namespace", &self.namespace)
            .field("ttl", &self.ttl)
            .field("mode", &self.mode)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

/// Update operation: always store the result after the call succeeds
pub struct CachePut<A, T> {
    pub(crate) namespaces: Vec<String>,
    pub(crate) ttl: Duration,
    pub(crate) mode: WriteMode,
    pub(crate) strategy: KeyStrategy,
    key_builder: ResultKeyBuilder<A, T>,
}

impl<A, T> CachePut<A, T> {
    pub fn new<F>(namespaces: Vec<String>, key_builder: F) -> Self
    where
        F: Fn(&A, &T) -> KeyComponents + Send + Sync + 'static,
    {
        Self {
            namespaces,
            ttl: Duration::ZERO,
            mode: WriteMode::Sync,
            strategy: KeyStrategy::default(),
            key_builder: Box::new(key_builder),
        }
    }

    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: KeyStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn key_for(&self, args: &A, result: &T) -> CacheKey {
        self.strategy.generate(&(self.key_builder)(args, result))
    }
}

impl<A, T> fmt::Debug for CachePut<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachePut")
            .field("namespaces", &self.namespaces)
            .field("ttl", &self.ttl)
            .field("mode", &self.mode)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

/// Delete operation: evict one key, or whole namespaces, after the call succeeds
pub struct CacheEvict<A, T> {
    pub(crate) namespaces: Vec<String>,
    pub(crate) mode: WriteMode,
    pub(crate) strategy: KeyStrategy,
    key_builder: Option<ResultKeyBuilder<A, T>>,
}

impl<A, T> CacheEvict<A, T> {
    /// Evict the key built from the call
    pub fn key<F>(namespaces: Vec<String>, key_builder: F) -> Self
    where
        F: Fn(&A, &T) -> KeyComponents + Send + Sync + 'static,
    {
        Self {
            namespaces,
            mode: WriteMode::Sync,
            strategy: KeyStrategy::default(),
            key_builder: Some(Box::new(key_builder)),
        }
    }

    /// Drop every entry of the namespaces
    pub fn all_entries(namespaces: Vec<String>) -> Self {
        Self {
            namespaces,
            mode: WriteMode::Sync,
            strategy: KeyStrategy::default(),
            key_builder: None,
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: KeyStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn is_all_entries(&self) -> bool {
        self.key_builder.is_none()
    }

    /// Key to evict, `None` for a whole-namespace eviction
    pub fn key_for(&self, args: &A, result: &T) -> Option<CacheKey> {
        self.key_builder
            .as_ref()
            .map(|build| self.strategy.generate(&build(args, result)))
    }
}

impl<A, T> fmt::Debug for CacheEvict<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEvict")
            .field("namespaces", &self.namespaces)
            .field("mode", &self.mode)
            .field("all_entries", &self.is_all_entries())
            .finish_non_exhaustive()
    }
}
