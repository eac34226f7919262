//! Value Codec Port
//!
//! The remote tier stores bytes produced by a codec; the local tier always
//! holds the decoded payload.

use crate::error::Result;

/// Reversible byte transform for remotely stored values
pub trait ValueCodec: Send + Sync + std::fmt::Debug {
    /// Transform a payload before it is written remotely
    fn encode(&self, payload: &[u8]) -> Result<Vec<u8>>;

    /// Undo [`encode`](Self::encode) on bytes read back
    fn decode(&self, stored: &[u8]) -> Result<Vec<u8>>;

    /// Codec identifier for logs
    fn name(&self) -> &str;
}
