//! Configuration types module

pub mod app;
pub mod cache;
pub mod executor;
pub mod invalidation;
pub mod local;
pub mod logging;
pub mod redis;

// Re-export main types
pub use app::AppConfig;
pub use cache::CacheConfig;
pub use executor::ExecutorConfig;
pub use invalidation::{BusProvider, InvalidationConfig};
pub use local::LocalConfig;
pub use logging::LoggingConfig;
pub use redis::RedisConfig;
