//! Storage Provider Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | LocalCache | Per-process bounded namespace tables |
//! | RemoteBackend | Shared namespaced key-value store with TTLs |
//! | ValueCodec | Byte transform applied to values stored remotely |

/// Value codec port
pub mod codec;
/// Local (near) cache port
pub mod local_cache;
/// Remote (shared) backend port
pub mod remote_backend;

pub use codec::ValueCodec;
pub use local_cache::{LocalCache, LocalHit};
pub use remote_backend::RemoteBackend;
