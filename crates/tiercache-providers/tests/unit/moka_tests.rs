//! Moka Local Cache Tests

use std::sync::Arc;
use std::time::Duration;
use tiercache_domain::ports::LocalCache;
use tiercache_domain::{CacheKey, CacheValue, LocalPolicy};
use tiercache_providers::MokaLocalCache;

fn key(k: &str) -> CacheKey {
    CacheKey::from(k)
}

#[tokio::test]
async fn test_moka_basic_operations() {
    let local = MokaLocalCache::default();

    local.put("orders", &key("123"), CacheValue::from("A")).await;
    let hit = local.get("orders", &key("123")).await.unwrap();
    assert_eq!(hit.value, CacheValue::from("A"));
    assert!(!hit.needs_refresh);

    local.invalidate("orders", &key("123")).await;
    assert!(local.get("orders", &key("123")).await.is_none());
}

#[tokio::test]
async fn test_moka_unknown_namespace_is_a_miss() {
    let local = MokaLocalCache::default();

    assert!(local.get("missing", &key("1")).await.is_none());
    local.invalidate("missing", &key("1")).await;
    local.invalidate_all("missing").await;
    assert_eq!(local.entry_count("missing").await, 0);
    assert!(local.namespaces().is_empty());
}

#[tokio::test]
async fn test_moka_namespaces_are_independent() {
    let local = MokaLocalCache::default();

    local.put("orders", &key("1"), CacheValue::from("order")).await;
    local.put("users", &key("1"), CacheValue::from("user")).await;

    local.invalidate_all("orders").await;

    assert!(local.get("orders", &key("1")).await.is_none());
    assert_eq!(
        local.get("users", &key("1")).await.unwrap().value,
        CacheValue::from("user")
    );
    assert_eq!(local.namespaces(), vec!["users".to_string()]);
}

#[tokio::test]
async fn test_moka_concurrent_first_writers_share_one_table() {
    let local = Arc::new(MokaLocalCache::default());

    let mut handles = Vec::new();
    for i in 0..16u64 {
        let local = Arc::clone(&local);
        handles.push(tokio::spawn(async move {
            local
                .put("orders", &CacheKey::Hash(i), CacheValue::from("v"))
                .await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(local.namespaces().len(), 1);
    assert_eq!(local.entry_count("orders").await, 16);
}

#[tokio::test]
async fn test_moka_maximum_size_is_enforced() {
    let local = MokaLocalCache::new(LocalPolicy::from_settings(10, 0, 0, 0, 0));

    for i in 0..100u64 {
        local
            .put("orders", &CacheKey::Hash(i), CacheValue::from("v"))
            .await;
    }

    assert!(local.entry_count("orders").await <= 10);
}

#[tokio::test]
async fn test_moka_expire_after_write() {
    let local = MokaLocalCache::new(LocalPolicy::from_settings(0, 50, 0, 0, 0));

    local.put("orders", &key("1"), CacheValue::from("v")).await;
    assert!(local.get("orders", &key("1")).await.is_some());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(local.get("orders", &key("1")).await.is_none());
}

#[tokio::test]
async fn test_moka_refresh_after_write_flags_stale_entries() {
    let local = MokaLocalCache::new(LocalPolicy::from_settings(0, 0, 0, 30, 0));

    local.put("orders", &key("1"), CacheValue::from("v")).await;
    assert!(!local.get("orders", &key("1")).await.unwrap().needs_refresh);

    tokio::time::sleep(Duration::from_millis(60)).await;
    let hit = local.get("orders", &key("1")).await.unwrap();
    assert!(hit.needs_refresh);
    assert_eq!(hit.value, CacheValue::from("v"));

    // a rewrite restarts the window
    local.put("orders", &key("1"), CacheValue::from("v2")).await;
    assert!(!local.get("orders", &key("1")).await.unwrap().needs_refresh);
}

#[test]
fn test_moka_provider_name() {
    let local = MokaLocalCache::default();
    assert_eq!(local.provider_name(), "moka");
    assert!(format!("{local:?}").contains("MokaLocalCache"));
}
