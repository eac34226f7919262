//! In-memory remote backend tests

use std::sync::Arc;
use std::time::Duration;
use tiercache_domain::ports::RemoteBackend;
use tiercache_domain::{CacheKey, CacheValue};
use tiercache_providers::{GzipCodec, InMemoryRemoteBackend, ManualClock};

fn ns(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

fn backend_with_clock() -> (InMemoryRemoteBackend, ManualClock) {
    let clock = ManualClock::new();
    let backend = InMemoryRemoteBackend::new().with_clock(Arc::new(clock.clone()));
    (backend, clock)
}

#[tokio::test]
async fn test_put_get_delete() {
    let backend = InMemoryRemoteBackend::new();
    let key = CacheKey::from("123");

    backend
        .put(&ns(&["orders"]), &key, &CacheValue::from("A"), Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(
        backend.get("orders", &key).await.unwrap(),
        Some(CacheValue::from("A"))
    );

    backend.delete(&ns(&["orders"]), &key).await.unwrap();
    assert_eq!(backend.get("orders", &key).await.unwrap(), None);
    // the namespace survives a single-key delete
    assert!(backend.exists("orders").await.unwrap());
}

#[tokio::test]
async fn test_put_writes_every_namespace() {
    let backend = InMemoryRemoteBackend::new();
    let key = CacheKey::Hash(7);

    backend
        .put(&ns(&["orders", "audit"]), &key, &CacheValue::from("v"), Duration::ZERO)
        .await
        .unwrap();

    assert!(backend.get("orders", &key).await.unwrap().is_some());
    assert!(backend.get("audit", &key).await.unwrap().is_some());
}

#[tokio::test]
async fn test_first_write_sets_namespace_expiry_once() {
    let (backend, _clock) = backend_with_clock();
    let backend = backend.with_namespace_ttl(Duration::from_secs(86_400));

    backend
        .put(&ns(&["orders"]), &CacheKey::from("K1"), &CacheValue::from("1"), Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(backend.first_write_batches(), 1);
    assert_eq!(backend.namespace_expiry("orders"), Some(Duration::from_secs(86_400)));
    assert_eq!(
        backend.entry_expiry("orders", &CacheKey::from("K1")),
        Some(Duration::from_secs(10))
    );

    backend
        .put(&ns(&["orders"]), &CacheKey::from("K2"), &CacheValue::from("2"), Duration::from_secs(20))
        .await
        .unwrap();
    assert_eq!(backend.first_write_batches(), 1);
    assert_eq!(
        backend.entry_expiry("orders", &CacheKey::from("K2")),
        Some(Duration::from_secs(20))
    );
}

#[tokio::test]
async fn test_entry_ttl_expiry() {
    let (backend, clock) = backend_with_clock();
    let key = CacheKey::from("123");

    backend
        .put(&ns(&["orders"]), &key, &CacheValue::from("A"), Duration::from_secs(10))
        .await
        .unwrap();

    clock.advance(Duration::from_secs(9));
    assert!(backend.get("orders", &key).await.unwrap().is_some());

    clock.advance(Duration::from_secs(2));
    assert!(backend.get("orders", &key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_zero_ttl_lives_until_namespace_expires() {
    let (backend, clock) = backend_with_clock();
    let backend = backend.with_namespace_ttl(Duration::from_secs(60));
    let key = CacheKey::from("forever");

    backend
        .put(&ns(&["orders"]), &key, &CacheValue::from("A"), Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(backend.entry_expiry("orders", &key), None);

    clock.advance(Duration::from_secs(59));
    assert!(backend.get("orders", &key).await.unwrap().is_some());

    clock.advance(Duration::from_secs(1));
    assert!(backend.get("orders", &key).await.unwrap().is_none());
    assert!(!backend.exists("orders").await.unwrap());

    // a write after namespace expiry is a first write again
    backend
        .put(&ns(&["orders"]), &key, &CacheValue::from("B"), Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(backend.first_write_batches(), 2);
}

#[tokio::test]
async fn test_delete_all_drops_namespace() {
    let backend = InMemoryRemoteBackend::new();

    for i in 0..3u64 {
        backend
            .put(&ns(&["orders"]), &CacheKey::Hash(i), &CacheValue::from("v"), Duration::ZERO)
            .await
            .unwrap();
    }
    backend.delete_all(&ns(&["orders"])).await.unwrap();

    assert!(!backend.exists("orders").await.unwrap());
    assert!(backend.get("orders", &CacheKey::Hash(0)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_arguments_are_rejected() {
    let backend = InMemoryRemoteBackend::new();
    let value = CacheValue::from("v");

    let empty: Vec<String> = Vec::new();
    let err = backend
        .put(&empty, &CacheKey::from("k"), &value, Duration::ZERO)
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    let err = backend
        .put(&ns(&["orders"]), &CacheKey::from(""), &value, Duration::ZERO)
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    assert!(backend.get("", &CacheKey::from("k")).await.unwrap_err().is_invalid_argument());
    assert!(backend
        .delete(&ns(&[" "]), &CacheKey::from("k"))
        .await
        .unwrap_err()
        .is_invalid_argument());
    assert!(backend.delete_all(&empty).await.unwrap_err().is_invalid_argument());
}

#[tokio::test]
async fn test_unavailable_is_distinct_from_miss() {
    let backend = InMemoryRemoteBackend::new();
    let key = CacheKey::from("k");

    assert_eq!(backend.get("orders", &key).await.unwrap(), None);

    backend.set_available(false);
    let err = backend.get("orders", &key).await.unwrap_err();
    assert!(err.is_backend_unavailable());
    assert!(backend
        .put(&ns(&["orders"]), &key, &CacheValue::from("v"), Duration::ZERO)
        .await
        .unwrap_err()
        .is_backend_unavailable());

    backend.set_available(true);
    assert!(backend.get("orders", &key).await.is_ok());
}

#[tokio::test]
async fn test_codec_is_applied() {
    let backend = InMemoryRemoteBackend::new().with_codec(Arc::new(GzipCodec::default()));
    let key = CacheKey::from("k");
    let value = CacheValue::from("x".repeat(1_000).as_str());

    backend
        .put(&ns(&["orders"]), &key, &value, Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(backend.get("orders", &key).await.unwrap(), Some(value));
    assert_eq!(backend.get_calls(), 1);
}
