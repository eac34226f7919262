//! Domain Value Objects
//!
//! Immutable values exchanged between the cache tiers.
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`NodeId`] | Process identity stamped on every broadcast |
//! | [`CacheKey`] | Strategy-generated key (hash or canonical text) |
//! | [`KeyComponents`] | Ordered key parts fed to a [`KeyStrategy`] |
//! | [`CacheValue`] | Opaque, cheaply cloneable payload |
//! | [`InvalidationMessage`] | Cross-node "these namespaces changed" notice |
//! | [`LocalPolicy`] | Eviction policy applied to every local namespace table |

/// Cache keys and key generation strategies
pub mod key;
/// Invalidation wire message
pub mod message;
/// Namespace validation
pub mod namespace;
/// Process identity
pub mod node;
/// Local tier eviction policy
pub mod policy;
/// Opaque cache payloads
pub mod value;

pub use key::{CacheKey, KeyComponents, KeyStrategy};
pub use message::InvalidationMessage;
pub use namespace::{validate_namespace, validate_namespaces};
pub use node::NodeId;
pub use policy::LocalPolicy;
pub use value::CacheValue;
