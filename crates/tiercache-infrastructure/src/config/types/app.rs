//! Main application configuration

use super::{
    CacheConfig, ExecutorConfig, InvalidationConfig, LocalConfig, LoggingConfig, RedisConfig,
};
use serde::{Deserialize, Serialize};

/// Root of the configuration tree
///
/// Every section falls back to its defaults when absent from the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Cache switches and namespace lifetime
    pub cache: CacheConfig,
    /// Background executor sizing
    pub executor: ExecutorConfig,
    /// Remote tier connection
    pub redis: RedisConfig,
    /// Local tier eviction policy
    pub local: LocalConfig,
    /// Cross-node invalidation transport
    pub invalidation: InvalidationConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}
