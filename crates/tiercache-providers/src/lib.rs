//! # tiercache - Provider Implementations
//!
//! Concrete implementations of the ports defined in `tiercache-domain`.
//!
//! ## Provider Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Local tier | `LocalCache` | Moka |
//! | Remote tier | `RemoteBackend` | Redis, InMemory |
//! | Invalidation | `InvalidationBus` | Redis pub/sub, Nats, Tokio broadcast, Null |
//! | Codec | `ValueCodec` | Identity, Gzip |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! tiercache-providers = { version = "0.1", default-features = false, features = ["bus-nats"] }
//! ```
//!
//! `backend-redis` (default) enables the Redis backend and the Redis pub/sub
//! bus; `bus-nats` enables the NATS bus.

pub use tiercache_domain::error::{Error, Result};
pub use tiercache_domain::ports::{InvalidationBus, LocalCache, RemoteBackend, ValueCodec};

/// Provider-specific constants
pub mod constants;

/// Byte codecs applied to remotely stored values
pub mod codec;

/// Invalidation bus implementations
pub mod events;

/// Local (near) cache implementations
pub mod local;

/// Remote backend implementations
pub mod remote;

pub use codec::{GzipCodec, IdentityCodec};
#[cfg(feature = "bus-nats")]
pub use events::NatsInvalidationBus;
#[cfg(feature = "backend-redis")]
pub use events::RedisInvalidationBus;
pub use events::{NullInvalidationBus, TokioInvalidationBus};
pub use local::MokaLocalCache;
#[cfg(feature = "backend-redis")]
pub use remote::{RedisBackendConfig, RedisEndpoint, RedisRemoteBackend};
pub use remote::{Clock, InMemoryRemoteBackend, ManualClock, SystemClock};
