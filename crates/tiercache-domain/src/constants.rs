//! Domain layer constants
//!
//! Defaults that are part of the cache protocol itself. Deployment defaults
//! (pool sizes, timeouts) live in the infrastructure config types.

/// Separator placed before and after every key component
pub const KEY_DELIMITER: char = ':';

/// Fallback lifetime of a whole remote namespace (24 hours)
pub const DEFAULT_NAMESPACE_TTL_SECS: u64 = 24 * 3600;

/// Channel shared by every node for invalidation broadcasts
pub const DEFAULT_INVALIDATION_CHANNEL: &str = "cache:redis:caffeine:topic";

/// Number of leading digest bytes folded into a hash key
pub const HASH_KEY_BYTES: usize = 8;
