//! Composition Root
//!
//! Builds the whole cache graph from an [`AppConfig`]:
//!
//! ```text
//! codec ─► remote backend ─┐
//! executor (+ guard) ──────┼─► CacheCoordinator ─► CacheInterceptor
//! local cache + bus ───────┘        │
//!   (second tier only)              └─► listener subscription
//! ```
//!
//! [`build`] connects to the configured Redis deployment and bus;
//! [`build_with`] takes prebuilt ports, which is how tests and embedders
//! plug in in-memory parts. With `cache.enabled = false` nothing external
//! is contacted: the interceptor passes every call straight through and the
//! coordinator sits on an in-process store.

use crate::config::{AppConfig, BusProvider};
use crate::executor::{BoundedExecutor, ExecutorShutdownGuard};
use std::sync::Arc;
use tiercache_application::{CacheCoordinator, CacheInterceptor};
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{InvalidationBus, LocalCache, RemoteBackend, Subscription};
use tiercache_providers::codec;
use tiercache_providers::{
    InMemoryRemoteBackend, MokaLocalCache, NullInvalidationBus, RedisInvalidationBus,
    RedisRemoteBackend, TokioInvalidationBus,
};
use tracing::{info, warn};

/// Everything a running cache needs, owned together
///
/// Drop order matters little: the subscription stops delivery on drop and
/// the executor guard aborts undrained work. Call
/// [`shutdown`](Self::shutdown) for an orderly stop.
#[derive(Debug)]
pub struct CacheRuntime {
    pub coordinator: Arc<CacheCoordinator>,
    pub interceptor: CacheInterceptor,
    pub executor_guard: ExecutorShutdownGuard,
    pub subscription: Option<Subscription>,
}

impl CacheRuntime {
    /// Stop receiving invalidations, then drain the executor
    pub async fn shutdown(self) -> crate::executor::ShutdownReport {
        if let Some(subscription) = self.subscription {
            subscription.cancel();
        }
        self.executor_guard.drain().await
    }
}

/// Prebuilt local tier and bus
pub struct NearTierParts {
    pub local: Arc<dyn LocalCache>,
    pub bus: Arc<dyn InvalidationBus>,
}

/// Build the runtime described by `config`
///
/// An unreachable Redis at startup is logged and the backend connects on
/// first use; the cache then degrades to misses until it comes back.
pub async fn build(config: &AppConfig) -> Result<CacheRuntime> {
    if !config.cache.enabled {
        info!("Cache disabled, building a pass-through runtime");
        return build_with(config, Arc::new(InMemoryRemoteBackend::new()), None).await;
    }

    let remote = build_remote(config).await?;
    let near = if config.cache.second_tier_enabled {
        Some(NearTierParts {
            local: Arc::new(MokaLocalCache::new(config.local.policy())),
            bus: build_bus(config).await?,
        })
    } else {
        None
    };
    build_with(config, remote, near).await
}

/// Build the runtime around prebuilt ports
///
/// The executor is always created here so its lifetime is tied to the
/// returned guard.
pub async fn build_with(
    config: &AppConfig,
    remote: Arc<dyn RemoteBackend>,
    near: Option<NearTierParts>,
) -> Result<CacheRuntime> {
    let executor = Arc::new(BoundedExecutor::new(config.executor.clone())?);
    let executor_guard =
        ExecutorShutdownGuard::new(Arc::clone(&executor), config.executor.shutdown_grace());

    let mut builder = CacheCoordinator::builder(remote).executor(executor);
    if let Some(near) = near {
        builder = builder.near_tier(near.local, near.bus);
    }
    let coordinator = Arc::new(builder.build());
    let subscription = coordinator.start().await?;
    let interceptor = CacheInterceptor::new(Arc::clone(&coordinator), config.cache.enabled)
        .with_default_ttl(config.cache.default_entry_ttl());

    info!(
        node = %coordinator.node_id(),
        two_tier = coordinator.is_two_tier(),
        enabled = config.cache.enabled,
        remote = coordinator.remote().provider_name(),
        "Cache runtime ready"
    );

    Ok(CacheRuntime {
        coordinator,
        interceptor,
        executor_guard,
        subscription,
    })
}

async fn build_remote(config: &AppConfig) -> Result<Arc<dyn RemoteBackend>> {
    let backend_config = config
        .redis
        .backend_config(config.cache.namespace_ttl())
        .ok_or_else(|| Error::configuration("Redis host or cluster nodes must be set"))?;
    let value_codec = codec::select(config.redis.use_compression);

    match RedisRemoteBackend::connect_with_codec(backend_config.clone(), Arc::clone(&value_codec))
        .await
    {
        Ok(backend) => Ok(Arc::new(backend)),
        Err(e) if e.is_backend_unavailable() => {
            warn!(error = %e, "Redis unreachable at startup, connecting on first use");
            Ok(Arc::new(RedisRemoteBackend::lazy(backend_config, value_codec)?))
        }
        Err(e) => Err(e),
    }
}

async fn build_bus(config: &AppConfig) -> Result<Arc<dyn InvalidationBus>> {
    let invalidation = &config.invalidation;
    let channel = invalidation.channel.clone();
    let bus: Arc<dyn InvalidationBus> = match invalidation.provider {
        BusProvider::Redis => {
            let url = config
                .redis
                .pubsub_url()
                .ok_or_else(|| Error::configuration("Redis pub/sub needs a Redis endpoint"))?;
            Arc::new(RedisInvalidationBus::new(&url, channel)?)
        }
        BusProvider::Nats => connect_nats(config).await?,
        BusProvider::Tokio => {
            Arc::new(TokioInvalidationBus::with_capacity(invalidation.capacity).with_channel(channel))
        }
        BusProvider::Null => Arc::new(NullInvalidationBus::new()),
    };
    info!(
        bus = bus.provider_name(),
        channel = bus.channel(),
        "Invalidation bus configured"
    );
    Ok(bus)
}

#[cfg(feature = "bus-nats")]
async fn connect_nats(config: &AppConfig) -> Result<Arc<dyn InvalidationBus>> {
    let url = config
        .invalidation
        .nats_url
        .as_deref()
        .ok_or_else(|| Error::configuration("NATS URL must be set for the nats provider"))?;
    let bus = tiercache_providers::NatsInvalidationBus::connect(
        url,
        config.invalidation.channel.clone(),
    )
    .await?;
    Ok(Arc::new(bus))
}

#[cfg(not(feature = "bus-nats"))]
async fn connect_nats(_config: &AppConfig) -> Result<Arc<dyn InvalidationBus>> {
    Err(Error::configuration(
        "The nats invalidation provider requires the bus-nats feature",
    ))
}
