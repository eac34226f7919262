//! # tiercache
//!
//! Two-tier cache: a per-process Moka near-cache in front of a shared
//! Redis tier, kept coherent across nodes by broadcasting invalidations.
//!
//! ## Example
//!
//! ```ignore
//! use tiercache::infrastructure::{bootstrap, ConfigLoader};
//! use tiercache::{Cacheable, KeyComponents};
//!
//! let config = ConfigLoader::new().load()?;
//! let runtime = bootstrap::build(&config).await?;
//!
//! let by_id = Cacheable::new("orders", |id: &u64| KeyComponents::new().push(id));
//! let order = runtime
//!     .interceptor
//!     .cacheable(&by_id, 123, |id| async move { repository.load(id).await })
//!     .await?;
//!
//! runtime.shutdown().await;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Value objects, errors and port traits
//! - `application` - Coordinator, invalidation listener, interceptor
//! - `providers` - Moka, Redis, NATS, tokio and in-memory implementations
//! - `infrastructure` - Executor, configuration, logging, composition root

/// Domain layer - value objects, errors and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use tiercache_domain::*;
}

/// Application layer - cache protocols
pub mod application {
    pub use tiercache_application::*;
}

/// Provider implementations
pub mod providers {
    pub use tiercache_providers::*;
}

/// Infrastructure layer - executor, config, logging and bootstrap
pub mod infrastructure {
    pub use tiercache_infrastructure::*;
}

// Re-export commonly used types at the crate root
pub use application::{
    CacheCoordinator, CacheEvict, CacheInterceptor, CachePut, Cacheable, WriteMode,
};
pub use domain::{CacheKey, CacheValue, Error, KeyComponents, KeyStrategy, NodeId, Result};
pub use infrastructure::{AppConfig, CacheRuntime, ConfigLoader};
