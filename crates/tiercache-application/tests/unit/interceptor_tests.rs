//! Interceptor tests: descriptors around business calls

use crate::support::{FullExecutor, Node, namespaces, settle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tiercache_application::{
    CacheCoordinator, CacheEvict, CacheInterceptor, CachePut, Cacheable, WriteMode,
};
use tiercache_domain::ports::{LocalCache, RemoteBackend};
use tiercache_domain::{KeyComponents, KeyStrategy};
use tiercache_providers::{
    InMemoryRemoteBackend, ManualClock, MokaLocalCache, TokioInvalidationBus,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    id: u64,
    status: String,
}

impl Order {
    fn new(id: u64, status: &str) -> Self {
        Self {
            id,
            status: status.to_string(),
        }
    }
}

#[derive(Debug, PartialEq)]
struct NotFound(u64);

fn by_id() -> Cacheable<u64> {
    Cacheable::new("orders", |id: &u64| KeyComponents::new().push(id))
        .ttl(Duration::from_secs(600))
}

async fn interceptor() -> (Arc<InMemoryRemoteBackend>, Node, CacheInterceptor) {
    let backend = Arc::new(InMemoryRemoteBackend::new());
    let bus = Arc::new(TokioInvalidationBus::new());
    let node = Node::start("a", &backend, &bus).await;
    let interceptor = CacheInterceptor::new(Arc::clone(&node.coordinator), true);
    (backend, node, interceptor)
}

#[tokio::test]
async fn test_cacheable_hit_skips_the_call() {
    let (_backend, _node, interceptor) = interceptor().await;
    let operation = by_id();
    let calls = AtomicUsize::new(0);
    let counter = &calls;

    for _ in 0..3 {
        let order: Result<Order, NotFound> = interceptor
            .cacheable(&operation, 123, |id| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Order::new(id, "paid"))
            })
            .await;
        assert_eq!(order.unwrap(), Order::new(123, "paid"));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cacheable_stores_under_generated_key() {
    let (backend, _node, interceptor) = interceptor().await;
    let operation = Cacheable::new("orders", |id: &u64| KeyComponents::new().push("order").push(id))
        .strategy(KeyStrategy::Concatenation);

    let _: Result<Order, NotFound> = interceptor
        .cacheable(&operation, 5, |id| async move { Ok(Order::new(id, "new")) })
        .await;

    let stored = backend
        .get("orders", &operation.key_for(&5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.from_json::<Order>().unwrap(), Order::new(5, "new"));
    assert_eq!(operation.key_for(&5).to_string(), ":order:5:");
}

#[tokio::test]
async fn test_disabled_interceptor_always_computes() {
    let (backend, node, _) = interceptor().await;
    let interceptor = CacheInterceptor::new(Arc::clone(&node.coordinator), false);
    let operation = by_id();
    let calls = AtomicUsize::new(0);
    let counter = &calls;

    for _ in 0..2 {
        let _: Result<Order, NotFound> = interceptor
            .cacheable(&operation, 1, |id| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Order::new(id, "paid"))
            })
            .await;
    }

    assert!(!interceptor.is_enabled());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(backend.first_write_batches(), 0);
}

#[tokio::test]
async fn test_business_error_passes_through_uncached() {
    let (backend, _node, interceptor) = interceptor().await;
    let operation = by_id();

    let result: Result<Order, NotFound> = interceptor
        .cacheable(&operation, 9, |id| async move { Err(NotFound(id)) })
        .await;

    assert_eq!(result.unwrap_err(), NotFound(9));
    assert_eq!(backend.first_write_batches(), 0);
}

#[tokio::test]
async fn test_cache_put_overwrites_cached_value() {
    let (_backend, node, interceptor) = interceptor().await;
    let read = by_id();
    let update: CachePut<Order, Order> =
        CachePut::new(namespaces(&["orders"]), |_: &Order, saved: &Order| {
            KeyComponents::new().push(saved.id)
        })
        .ttl(Duration::from_secs(600));

    let _: Result<Order, NotFound> = interceptor
        .cacheable(&read, 1, |id| async move { Ok(Order::new(id, "new")) })
        .await;

    let saved: Result<Order, NotFound> = interceptor
        .cache_put(&update, Order::new(1, "shipped"), |order| async move { Ok(order) })
        .await;
    assert_eq!(saved.unwrap().status, "shipped");

    let cached: Option<Order> = node
        .coordinator
        .read_as("orders", &read.key_for(&1))
        .await
        .unwrap();
    assert_eq!(cached, Some(Order::new(1, "shipped")));
}

#[tokio::test]
async fn test_cache_evict_by_key() {
    let (backend, node, interceptor) = interceptor().await;
    let read = by_id();
    let remove: CacheEvict<u64, ()> =
        CacheEvict::key(namespaces(&["orders"]), |id: &u64, _: &()| {
            KeyComponents::new().push(id)
        });

    let _: Result<Order, NotFound> = interceptor
        .cacheable(&read, 1, |id| async move { Ok(Order::new(id, "new")) })
        .await;
    let key = read.key_for(&1);
    assert!(node.local.get("orders", &key).await.is_some());

    let _: Result<(), NotFound> = interceptor
        .cache_evict(&remove, 1, |_| async { Ok(()) })
        .await;

    assert!(node.local.get("orders", &key).await.is_none());
    assert!(backend.get("orders", &key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cache_evict_all_entries() {
    let (backend, node, interceptor) = interceptor().await;
    let read = by_id();
    let clear: CacheEvict<(), ()> = CacheEvict::all_entries(namespaces(&["orders"]));
    assert!(clear.is_all_entries());

    for id in 1..=3 {
        let _: Result<Order, NotFound> = interceptor
            .cacheable(&read, id, |id| async move { Ok(Order::new(id, "new")) })
            .await;
    }

    let _: Result<(), NotFound> = interceptor
        .cache_evict(&clear, (), |_| async { Ok(()) })
        .await;

    assert_eq!(node.local.entry_count("orders").await, 0);
    assert!(!backend.exists("orders").await.unwrap());
}

#[tokio::test]
async fn test_failed_call_does_not_evict() {
    let (_backend, node, interceptor) = interceptor().await;
    let read = by_id();
    let clear: CacheEvict<(), ()> = CacheEvict::all_entries(namespaces(&["orders"]));

    let _: Result<Order, NotFound> = interceptor
        .cacheable(&read, 1, |id| async move { Ok(Order::new(id, "new")) })
        .await;
    let result: Result<(), NotFound> = interceptor
        .cache_evict(&clear, (), |_| async { Err(NotFound(1)) })
        .await;

    assert!(result.is_err());
    assert_eq!(node.local.entry_count("orders").await, 1);
}

#[tokio::test]
async fn test_full_queue_falls_back_to_sync_write() {
    let backend = Arc::new(InMemoryRemoteBackend::new());
    let local = Arc::new(MokaLocalCache::default());
    let executor = Arc::new(FullExecutor::default());
    let coordinator = Arc::new(
        CacheCoordinator::builder(backend.clone())
            .near_tier(local.clone(), Arc::new(TokioInvalidationBus::new()))
            .executor(executor.clone())
            .build(),
    );
    let interceptor = CacheInterceptor::new(coordinator, true);
    let operation = by_id().mode(WriteMode::Async);
    let clear: CacheEvict<(), ()> =
        CacheEvict::all_entries(namespaces(&["orders"])).mode(WriteMode::Async);

    let _: Result<Order, NotFound> = interceptor
        .cacheable(&operation, 1, |id| async move { Ok(Order::new(id, "new")) })
        .await;

    assert_eq!(executor.rejected.load(Ordering::SeqCst), 1);
    assert!(backend.get("orders", &operation.key_for(&1)).await.unwrap().is_some());
    assert!(local.get("orders", &operation.key_for(&1)).await.is_some());

    let _: Result<(), NotFound> = interceptor
        .cache_evict(&clear, (), |_| async { Ok(()) })
        .await;

    assert_eq!(executor.rejected.load(Ordering::SeqCst), 2);
    assert!(!backend.exists("orders").await.unwrap());
}

#[tokio::test]
async fn test_async_mode_stores_in_background() {
    let (backend, _node, interceptor) = interceptor().await;
    let operation = by_id().mode(WriteMode::Async);

    let _: Result<Order, NotFound> = interceptor
        .cacheable(&operation, 2, |id| async move { Ok(Order::new(id, "new")) })
        .await;
    settle().await;

    assert!(backend.get("orders", &operation.key_for(&2)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_unavailable_backend_still_returns_value() {
    let (backend, _node, interceptor) = interceptor().await;
    backend.set_available(false);
    let operation = by_id();

    let order: Result<Order, NotFound> = interceptor
        .cacheable(&operation, 4, |id| async move { Ok(Order::new(id, "new")) })
        .await;

    assert_eq!(order.unwrap(), Order::new(4, "new"));
}

#[tokio::test]
async fn test_misconfigured_namespace_still_returns_value() {
    let (_backend, _node, interceptor) = interceptor().await;
    let operation = Cacheable::new("", |id: &u64| KeyComponents::new().push(id));
    let calls = AtomicUsize::new(0);
    let counter = &calls;

    for _ in 0..2 {
        let order: Result<Order, NotFound> = interceptor
            .cacheable(&operation, 4, |id| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Order::new(id, "new"))
            })
            .await;
        assert!(order.is_ok());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_default_ttl_applies_when_descriptor_has_none() {
    let clock = ManualClock::new();
    let backend = Arc::new(InMemoryRemoteBackend::new().with_clock(Arc::new(clock.clone())));
    let bus = Arc::new(TokioInvalidationBus::new());
    let node = Node::start("a", &backend, &bus).await;
    let interceptor = CacheInterceptor::new(Arc::clone(&node.coordinator), true)
        .with_default_ttl(Duration::from_secs(30));
    let operation = Cacheable::new("orders", |id: &u64| KeyComponents::new().push(id));

    let _: Result<Order, NotFound> = interceptor
        .cacheable(&operation, 9, |id| async move { Ok(Order::new(id, "new")) })
        .await;
    assert!(backend.get("orders", &operation.key_for(&9)).await.unwrap().is_some());

    clock.advance(Duration::from_secs(31));
    assert!(backend.get("orders", &operation.key_for(&9)).await.unwrap().is_none());
}
