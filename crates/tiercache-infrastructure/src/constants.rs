//! Infrastructure layer constants
//!
//! Deployment defaults. Protocol-level defaults are defined in
//! `tiercache_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "tiercache.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "TIERCACHE";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// EXECUTOR CONSTANTS
// ============================================================================

/// Long-lived workers
pub const EXECUTOR_DEFAULT_CORE_WORKERS: usize = 8;

/// Upper bound on workers including elastic ones
pub const EXECUTOR_DEFAULT_MAX_WORKERS: usize = 16;

/// Accepted but unfinished tasks before submissions are rejected
pub const EXECUTOR_DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Elastic workers retire after this long without work
pub const EXECUTOR_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;

/// Time granted to outstanding work on shutdown
pub const EXECUTOR_DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 60;

/// Name used in executor log records
pub const EXECUTOR_DEFAULT_NAME: &str = "tiercache-remote";

// ============================================================================
// REDIS CONSTANTS
// ============================================================================

/// Default Redis port
pub const REDIS_DEFAULT_PORT: u16 = 6379;

/// Default number of multiplexed connections
pub const REDIS_DEFAULT_POOL_SIZE: usize = 4;

/// Connections opened at startup
pub const REDIS_DEFAULT_MIN_IDLE: usize = 1;

/// Per-command timeout
pub const REDIS_DEFAULT_TIMEOUT_MS: u64 = 3000;

// ============================================================================
// INVALIDATION CONSTANTS
// ============================================================================

/// Broadcast buffer of the in-process bus
pub const TOKIO_BUS_DEFAULT_CAPACITY: usize = 1024;

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the configured log filter
pub const LOG_FILTER_ENV: &str = "TIERCACHE_LOG";

/// File stem used when the log path has none
pub const LOG_FILE_DEFAULT_STEM: &str = "tiercache";
