//! Value Codec Implementations
//!
//! | Codec | Description |
//! |-------|-------------|
//! | IdentityCodec | Stores payloads as-is |
//! | GzipCodec | Gzip-compresses payloads before they reach the remote store |

pub mod gzip;
pub mod identity;

pub use gzip::GzipCodec;
pub use identity::IdentityCodec;

use std::sync::Arc;
use tiercache_domain::ports::ValueCodec;

/// Pick the codec for the `use_compression` switch
pub fn select(use_compression: bool) -> Arc<dyn ValueCodec> {
    if use_compression {
        Arc::new(GzipCodec::default())
    } else {
        Arc::new(IdentityCodec)
    }
}
