//! # tiercache domain layer
//!
//! Error taxonomy, value objects and the port traits every other crate
//! builds on. Nothing in here performs I/O.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Single error enum and `Result` alias |
//! | [`value_objects`] | Node identity, keys, values, invalidation messages, local policy |
//! | [`ports`] | `LocalCache`, `RemoteBackend`, `ValueCodec`, `InvalidationBus`, `TaskSubmitter` |
//! | [`constants`] | Defaults shared across layers |

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use value_objects::{
    CacheKey, CacheValue, InvalidationMessage, KeyComponents, KeyStrategy, LocalPolicy, NodeId,
};
