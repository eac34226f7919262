//! Remote Backend Implementations
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | RedisRemoteBackend | Distributed | One Redis hash per namespace |
//! | InMemoryRemoteBackend | In-Process | Same contract in memory, with a controllable clock |

pub mod clock;
pub mod envelope;
pub mod memory;
#[cfg(feature = "backend-redis")]
pub mod redis;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::InMemoryRemoteBackend;
#[cfg(feature = "backend-redis")]
pub use self::redis::{RedisBackendConfig, RedisEndpoint, RedisRemoteBackend};

use tiercache_domain::CacheKey;
use tiercache_domain::error::Result;
use tiercache_domain::value_objects::{validate_namespace, validate_namespaces};

/// Argument checks shared by every backend
pub(crate) fn validate_keyed(namespaces: &[String], key: &CacheKey) -> Result<()> {
    validate_namespaces(namespaces)?;
    key.validate()
}

pub(crate) fn validate_lookup(namespace: &str, key: &CacheKey) -> Result<()> {
    validate_namespace(namespace)?;
    key.validate()
}
