//! Invalidation Bus Port
//!
//! Publish/subscribe channel carrying [`InvalidationMessage`]s between
//! nodes.
//!
//! ## Delivery
//!
//! Delivery is at-least-once with no ordering guarantee: a message may
//! arrive after a later one, or after a peer has already served a stale
//! local read. A publisher receives its own messages too; handlers are
//! expected to drop them by origin.
//!
//! Handlers run on the transport's delivery task. A handler error or panic
//! is caught and logged by the transport and never ends the subscription.

use crate::error::Result;
use crate::value_objects::InvalidationMessage;
use async_trait::async_trait;
use futures::future::AbortHandle;
use std::sync::Arc;

/// Receiver side of the bus
#[async_trait]
pub trait InvalidationHandler: Send + Sync {
    /// Handle one delivered message
    async fn on_message(&self, message: InvalidationMessage) -> Result<()>;
}

/// Invalidation bus port
#[async_trait]
pub trait InvalidationBus: Send + Sync + std::fmt::Debug {
    /// Broadcast `message` to every subscriber, the publisher included
    ///
    /// Returns the number of receivers when the transport reports it.
    async fn publish(&self, message: &InvalidationMessage) -> Result<usize>;

    /// Register `handler`; it is called once per received message until the
    /// returned [`Subscription`] is cancelled or dropped
    async fn subscribe(&self, handler: Arc<dyn InvalidationHandler>) -> Result<Subscription>;

    /// Channel or subject name shared by the fleet
    fn channel(&self) -> &str;

    /// Provider identifier (e.g., "redis", "nats", "tokio")
    fn provider_name(&self) -> &str;
}

/// Live registration of a handler on a bus
///
/// Owns the delivery loop; dropping it stops delivery.
#[derive(Debug)]
pub struct Subscription {
    id: String,
    abort: AbortHandle,
}

impl Subscription {
    pub fn new<S: Into<String>>(id: S, abort: AbortHandle) -> Self {
        Self {
            id: id.into(),
            abort,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// True until the subscription is cancelled
    pub fn is_active(&self) -> bool {
        !self.abort.is_aborted()
    }

    /// Stop delivery
    pub fn cancel(self) {
        self.abort.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.abort.abort();
    }
}
