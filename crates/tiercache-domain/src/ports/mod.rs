//! Domain Port Interfaces
//!
//! Boundary contracts implemented by the providers and infrastructure
//! crates. The coordinator only ever talks to these traits.
//!
//! ## Organization
//!
//! - **providers/** - Storage tiers and the value codec
//! - **infrastructure/** - Invalidation transport and background execution

/// Infrastructure service ports
pub mod infrastructure;
/// Storage provider ports
pub mod providers;

pub use infrastructure::{
    BoxTask, InvalidationBus, InvalidationHandler, Subscription, TaskSubmitter,
};
pub use providers::{LocalCache, LocalHit, RemoteBackend, ValueCodec};
