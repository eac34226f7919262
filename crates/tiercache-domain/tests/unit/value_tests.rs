//! Value, namespace and policy tests

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tiercache_domain::value_objects::{validate_namespace, validate_namespaces};
use tiercache_domain::{CacheValue, LocalPolicy};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Order {
    id: u32,
    status: String,
}

#[test]
fn test_value_json_roundtrip() {
    let order = Order {
        id: 7,
        status: "paid".to_string(),
    };
    let value = CacheValue::to_json(&order).unwrap();
    assert_eq!(value.from_json::<Order>().unwrap(), order);
}

#[test]
fn test_value_clones_share_bytes() {
    let value = CacheValue::from("payload");
    let clone = value.clone();
    assert_eq!(value.as_bytes().as_ptr(), clone.as_bytes().as_ptr());
    assert_eq!(clone.len(), 7);
}

#[test]
fn test_namespace_validation() {
    assert!(validate_namespace("orders").is_ok());
    assert!(validate_namespace("  ").is_err());
    assert!(validate_namespaces::<String>(&[]).is_err());
    assert!(validate_namespaces(&["orders", ""]).is_err());
    assert!(validate_namespaces(&["orders", "users"]).is_ok());
}

#[test]
fn test_policy_zero_disables_dimension() {
    let policy = LocalPolicy::from_settings(100, 0, 5_000, 0, 16);
    assert_eq!(policy.maximum_size, Some(100));
    assert_eq!(policy.expire_after_write, None);
    assert_eq!(policy.expire_after_access, Some(Duration::from_secs(5)));
    assert_eq!(policy.refresh_after_write, None);
    assert_eq!(policy.initial_capacity, Some(16));
    assert_eq!(LocalPolicy::from_settings(0, 0, 0, 0, 0), LocalPolicy::default());
}
