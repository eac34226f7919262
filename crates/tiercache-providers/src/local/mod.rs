//! Local Cache Implementations
//!
//! | Provider | Description |
//! |----------|-------------|
//! | MokaLocalCache | One bounded Moka table per namespace |

pub mod moka;

pub use self::moka::MokaLocalCache;
