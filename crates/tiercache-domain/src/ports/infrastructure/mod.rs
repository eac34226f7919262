//! Infrastructure Service Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | InvalidationBus | Fleet-wide publish/subscribe of invalidation messages |
//! | TaskSubmitter | Bounded fire-and-forget execution |

/// Invalidation bus port
pub mod events;
/// Background execution port
pub mod executor;

pub use events::{InvalidationBus, InvalidationHandler, Subscription};
pub use executor::{BoxTask, TaskSubmitter};
