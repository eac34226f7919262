//! Cache Interceptor
//!
//! Wraps a business call with caching behaviour described by an operation
//! descriptor. The cache is never allowed to fail the call: every cache
//! error is logged and the business result is returned as-is.
//!
//! | Descriptor | Before the call | After a successful call |
//! |------------|-----------------|-------------------------|
//! | [`Cacheable`] | read; a hit skips the call | store the result |
//! | [`CachePut`] | nothing | store the result |
//! | [`CacheEvict`] | nothing | delete the key or drop the namespaces |
//!
//! ## Example
//!
//! ```ignore
//! let by_id = Cacheable::new("orders", |id: &u64| KeyComponents::new().push(id))
//!     .ttl(Duration::from_secs(600));
//!
//! let order = interceptor
//!     .cacheable(&by_id, 123, |id| async move { repository.load(id).await })
//!     .await?;
//! ```

mod operations;

pub use operations::{CacheEvict, CachePut, Cacheable};

use crate::coordinator::{CacheCoordinator, WriteMode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tiercache_domain::error::Error;
use tiercache_domain::CacheKey;
use tracing::{debug, error, warn};

/// Applies cache descriptors around business calls
#[derive(Clone)]
pub struct CacheInterceptor {
    coordinator: Arc<CacheCoordinator>,
    enabled: bool,
    default_ttl: Duration,
}

impl CacheInterceptor {
    pub fn new(coordinator: Arc<CacheCoordinator>, enabled: bool) -> Self {
        Self {
            coordinator,
            enabled,
            default_ttl: Duration::ZERO,
        }
    }

    /// Entry TTL applied when a descriptor leaves its own TTL at zero
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn coordinator(&self) -> &Arc<CacheCoordinator> {
        &self.coordinator
    }

    /// Serve from cache or run `compute` and cache its result
    pub async fn cacheable<A, T, E, F, Fut>(
        &self,
        operation: &Cacheable<A>,
        args: A,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.enabled {
            return compute(args).await;
        }

        let key = operation.key_for(&args);
        match self
            .coordinator
            .read_as::<T>(&operation.namespace, &key)
            .await
        {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => Self::report("read", &e),
        }

        let result = compute(args).await?;
        self.store(
            std::slice::from_ref(&operation.namespace),
            &key,
            &result,
            operation.ttl,
            operation.mode,
        )
        .await;
        Ok(result)
    }

    /// Run `compute` and store its result unconditionally
    pub async fn cache_put<A, T, E, F, Fut>(
        &self,
        operation: &CachePut<A, T>,
        args: A,
        compute: F,
    ) -> Result<T, E>
    where
        A: Clone,
        T: Serialize,
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.enabled {
            return compute(args).await;
        }

        let result = compute(args.clone()).await?;
        let key = operation.key_for(&args, &result);
        self.store(
            &operation.namespaces,
            &key,
            &result,
            operation.ttl,
            operation.mode,
        )
        .await;
        Ok(result)
    }

    /// Run `compute` and evict after it succeeds
    pub async fn cache_evict<A, T, E, F, Fut>(
        &self,
        operation: &CacheEvict<A, T>,
        args: A,
        compute: F,
    ) -> Result<T, E>
    where
        A: Clone,
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.enabled {
            return compute(args).await;
        }

        let result = compute(args.clone()).await?;
        let key = operation.key_for(&args, &result);
        self.evict(&operation.namespaces, key.as_ref(), operation.mode)
            .await;
        Ok(result)
    }

    async fn store<T: Serialize + ?Sized>(
        &self,
        namespaces: &[String],
        key: &CacheKey,
        value: &T,
        ttl: Duration,
        mode: WriteMode,
    ) {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        let mut outcome = self
            .coordinator
            .write_as(namespaces, key, value, ttl, mode)
            .await;
        if matches!(&outcome, Err(e) if e.is_queue_full()) {
            debug!(key = %key, "Executor queue full, writing synchronously");
            outcome = self
                .coordinator
                .write_as(namespaces, key, value, ttl, WriteMode::Sync)
                .await;
        }
        if let Err(e) = outcome {
            Self::report("write", &e);
        }
    }

    async fn evict(&self, namespaces: &[String], key: Option<&CacheKey>, mode: WriteMode) {
        let run = |mode: WriteMode| async move {
            match key {
                Some(key) => self.coordinator.delete(namespaces, key, mode).await,
                None => self.coordinator.delete_all(namespaces, mode).await,
            }
        };
        let mut outcome = run(mode).await;
        if matches!(&outcome, Err(e) if e.is_queue_full()) {
            debug!("Executor queue full, evicting synchronously");
            outcome = run(WriteMode::Sync).await;
        }
        if let Err(e) = outcome {
            Self::report("evict", &e);
        }
    }

    fn report(operation: &str, e: &Error) {
        if e.is_invalid_argument() {
            error!(operation, error = %e, "Cache operation misconfigured");
        } else {
            warn!(operation, error = %e, "Cache operation failed, continuing without cache");
        }
    }
}

impl std::fmt::Debug for CacheInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheInterceptor")
            .field("enabled", &self.enabled)
            .field("default_ttl", &self.default_ttl)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}
