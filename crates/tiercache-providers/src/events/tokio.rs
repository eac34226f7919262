//! Tokio Broadcast Invalidation Bus
//!
//! In-process bus on a tokio broadcast channel. Several coordinators
//! sharing one instance behave like nodes of a fleet, which makes this the
//! transport of choice for multi-node tests.
//!
//! ## Capacity
//!
//! A subscriber that falls more than `capacity` messages behind skips the
//! oldest ones; the gap is logged.
//!
//! ## Example
//!
//! ```ignore
//! use tiercache_providers::TokioInvalidationBus;
//!
//! let bus = TokioInvalidationBus::new();
//! let subscription = bus.subscribe(handler).await?;
//! bus.publish(&message).await?;
//! ```

use super::{deliver, subscription_id};
use crate::constants::TOKIO_BUS_DEFAULT_CAPACITY;
use async_trait::async_trait;
use futures::future::{AbortHandle, Abortable};
use std::sync::Arc;
use tiercache_domain::InvalidationMessage;
use tiercache_domain::constants::DEFAULT_INVALIDATION_CHANNEL;
use tiercache_domain::error::Result;
use tiercache_domain::ports::{InvalidationBus, InvalidationHandler, Subscription};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Invalidation bus using a tokio broadcast channel
#[derive(Clone)]
pub struct TokioInvalidationBus {
    sender: Arc<broadcast::Sender<InvalidationMessage>>,
    channel: String,
    capacity: usize,
}

impl TokioInvalidationBus {
    /// Create with default capacity (1024)
    pub fn new() -> Self {
        Self::with_capacity(TOKIO_BUS_DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
            channel: DEFAULT_INVALIDATION_CHANNEL.to_string(),
            capacity,
        }
    }

    #[must_use]
    pub fn with_channel<S: Into<String>>(mut self, channel: S) -> Self {
        self.channel = channel.into();
        self
    }

    /// Get the current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TokioInvalidationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokioInvalidationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioInvalidationBus")
            .field("channel", &self.channel)
            .field("capacity", &self.capacity)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

#[async_trait]
impl InvalidationBus for TokioInvalidationBus {
    async fn publish(&self, message: &InvalidationMessage) -> Result<usize> {
        match self.sender.send(message.clone()) {
            Ok(count) => {
                debug!(channel = %self.channel, receivers = count, "Published invalidation");
                Ok(count)
            }
            Err(_) => {
                debug!(channel = %self.channel, "Published invalidation but no subscribers");
                Ok(0)
            }
        }
    }

    async fn subscribe(&self, handler: Arc<dyn InvalidationHandler>) -> Result<Subscription> {
        let mut receiver = self.sender.subscribe();
        let channel = self.channel.clone();

        let delivery = async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => deliver(handler.as_ref(), message, "tokio").await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(channel = %channel, skipped, "Invalidation stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };

        let (abort, registration) = AbortHandle::new_pair();
        tokio::spawn(Abortable::new(delivery, registration));

        let id = subscription_id("tokio", &self.channel);
        debug!(subscription = %id, "Created subscription");
        Ok(Subscription::new(id, abort))
    }

    fn channel(&self) -> &str {
        &self.channel
    }

    fn provider_name(&self) -> &str {
        "tokio"
    }
}
