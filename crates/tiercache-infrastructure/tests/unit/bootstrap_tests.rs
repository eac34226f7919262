//! Composition root tests with in-memory providers

use std::sync::Arc;
use std::time::Duration;
use tiercache_application::{Cacheable, WriteMode};
use tiercache_domain::ports::RemoteBackend;
use tiercache_domain::{CacheKey, CacheValue, Error, KeyComponents};
use tiercache_infrastructure::bootstrap::{self, NearTierParts};
use tiercache_infrastructure::config::AppConfig;
use tiercache_providers::{InMemoryRemoteBackend, MokaLocalCache, TokioInvalidationBus};

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.redis.host = Some("unused".to_string());
    config.executor.core_workers = 2;
    config.executor.max_workers = 4;
    config.executor.shutdown_grace_secs = 5;
    config
}

fn near_tier() -> NearTierParts {
    NearTierParts {
        local: Arc::new(MokaLocalCache::default()),
        bus: Arc::new(TokioInvalidationBus::new()),
    }
}

#[tokio::test]
async fn test_two_tier_runtime() {
    let backend = Arc::new(InMemoryRemoteBackend::new());
    let runtime = bootstrap::build_with(&config(), backend.clone(), Some(near_tier()))
        .await
        .unwrap();

    assert!(runtime.coordinator.is_two_tier());
    assert!(runtime.subscription.as_ref().is_some_and(|s| s.is_active()));
    assert!(runtime.interceptor.is_enabled());

    let by_id = Cacheable::new("orders", |id: &u64| KeyComponents::new().push(id));
    let value: Result<String, Error> = runtime
        .interceptor
        .cacheable(&by_id, 7, |id| async move { Ok(format!("order-{id}")) })
        .await;
    assert_eq!(value.unwrap(), "order-7");
    assert!(backend.get("orders", &by_id.key_for(&7)).await.unwrap().is_some());

    let report = runtime.shutdown().await;
    assert!(report.completed_gracefully);
}

#[tokio::test]
async fn test_single_tier_runtime() {
    let runtime = bootstrap::build_with(&config(), Arc::new(InMemoryRemoteBackend::new()), None)
        .await
        .unwrap();

    assert!(!runtime.coordinator.is_two_tier());
    assert!(runtime.subscription.is_none());
}

#[tokio::test]
async fn test_async_writes_finish_before_drain_returns() {
    let backend = Arc::new(InMemoryRemoteBackend::new());
    let runtime = bootstrap::build_with(&config(), backend.clone(), Some(near_tier()))
        .await
        .unwrap();
    let orders = vec!["orders".to_string()];

    for i in 0..20u64 {
        runtime
            .coordinator
            .write(
                &orders,
                &CacheKey::Hash(i),
                CacheValue::from("v"),
                Duration::from_secs(60),
                WriteMode::Async,
            )
            .await
            .unwrap();
    }

    let report = runtime.shutdown().await;
    assert!(report.completed_gracefully);
    assert_eq!(report.cancelled, 0);
    for i in 0..20u64 {
        assert!(backend.get("orders", &CacheKey::Hash(i)).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn test_disabled_cache_bypasses_interceptor() {
    let mut config = config();
    config.cache.enabled = false;
    let backend = Arc::new(InMemoryRemoteBackend::new());
    let runtime = bootstrap::build_with(&config, backend.clone(), None)
        .await
        .unwrap();

    let by_id = Cacheable::new("orders", |id: &u64| KeyComponents::new().push(id));
    let _: Result<u64, Error> = runtime
        .interceptor
        .cacheable(&by_id, 1, |id| async move { Ok(id) })
        .await;

    assert!(!runtime.interceptor.is_enabled());
    assert!(!backend.exists("orders").await.unwrap());
}

#[tokio::test]
async fn test_build_requires_redis_endpoint() {
    let mut config = AppConfig::default();
    config.redis.host = None;

    let err = bootstrap::build(&config).await.unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[tokio::test]
async fn test_disabled_cache_builds_without_redis() {
    let mut config = AppConfig::default();
    config.cache.enabled = false;
    config.cache.second_tier_enabled = true;
    config.redis.host = None;
    config.redis.cluster_nodes = None;
    tiercache_infrastructure::config::loader::validate_app_config(&config).unwrap();

    let runtime = bootstrap::build(&config).await.unwrap();

    assert!(!runtime.interceptor.is_enabled());
    assert!(!runtime.coordinator.is_two_tier());
    assert!(runtime.subscription.is_none());
    assert_eq!(runtime.coordinator.remote().provider_name(), "memory");

    let by_id = Cacheable::new("orders", |id: &u64| KeyComponents::new().push(id));
    let value: Result<u64, Error> = runtime
        .interceptor
        .cacheable(&by_id, 4, |id| async move { Ok(id * 2) })
        .await;
    assert_eq!(value.unwrap(), 8);

    let report = runtime.shutdown().await;
    assert!(report.completed_gracefully);
}
