//! Provider Constants
//!
//! Constants specific to provider implementations. Domain-wide defaults
//! live in `tiercache_domain::constants`.

use std::time::Duration;

// ============================================================================
// REMOTE BACKEND CONSTANTS
// ============================================================================

/// Default Redis port
pub const REDIS_DEFAULT_PORT: u16 = 6379;

/// Default per-command timeout in milliseconds
pub const REDIS_DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Default number of multiplexed connections
pub const REDIS_DEFAULT_POOL_SIZE: usize = 4;

/// Length of the expiry header prefixed to every stored value
pub const ENVELOPE_HEADER_LEN: usize = 8;

// ============================================================================
// INVALIDATION BUS CONSTANTS
// ============================================================================

/// Default tokio broadcast channel capacity
pub const TOKIO_BUS_DEFAULT_CAPACITY: usize = 1024;

/// First reconnect delay after a pub/sub connection is lost
pub const BUS_RECONNECT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Upper bound for the reconnect delay
pub const BUS_RECONNECT_MAX_BACKOFF: Duration = Duration::from_secs(30);

// ============================================================================
// CODEC CONSTANTS
// ============================================================================

/// Identity codec name
pub const CODEC_IDENTITY: &str = "identity";

/// Gzip codec name
pub const CODEC_GZIP: &str = "gzip";
