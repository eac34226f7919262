//! NATS Invalidation Bus
//!
//! Distributed invalidation over a NATS subject. Messages are the same
//! JSON documents the Redis bus publishes.
//!
//! ## Example
//!
//! ```ignore
//! use tiercache_providers::NatsInvalidationBus;
//!
//! let bus = NatsInvalidationBus::connect("nats://localhost:4222", "tiercache.invalidation").await?;
//! ```

use super::{deliver_payload, subscription_id};
use async_nats::Client;
use async_trait::async_trait;
use futures::StreamExt;
use futures::future::{AbortHandle, Abortable};
use std::sync::Arc;
use tiercache_domain::InvalidationMessage;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{InvalidationBus, InvalidationHandler, Subscription};
use tracing::{debug, info, warn};

/// Invalidation bus on a NATS subject
pub struct NatsInvalidationBus {
    client: Client,
    subject: String,
}

impl NatsInvalidationBus {
    /// Connect to `url` and use `subject` for every message
    ///
    /// # Errors
    ///
    /// Returns an error if connection to NATS server fails.
    pub async fn connect<S: Into<String>>(url: &str, subject: S) -> Result<Self> {
        info!("Connecting to NATS server at {}", url);

        let client = async_nats::ConnectOptions::new()
            .name("tiercache")
            .connect(url)
            .await
            .map_err(|e| {
                Error::bus_with_source(format!("Failed to connect to NATS server at {url}"), e)
            })?;

        info!("Connected to NATS server at {}", url);

        Ok(Self {
            client,
            subject: subject.into(),
        })
    }
}

impl std::fmt::Debug for NatsInvalidationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsInvalidationBus")
            .field("subject", &self.subject)
            .finish()
    }
}

#[async_trait]
impl InvalidationBus for NatsInvalidationBus {
    async fn publish(&self, message: &InvalidationMessage) -> Result<usize> {
        let payload = message.encode()?;
        self.client
            .publish(self.subject.clone(), payload.into())
            .await
            .map_err(|e| {
                Error::bus_with_source(
                    format!("Failed to publish to NATS subject '{}'", self.subject),
                    e,
                )
            })?;

        debug!("Published invalidation to NATS subject '{}'", self.subject);
        // NATS does not report receivers
        Ok(0)
    }

    async fn subscribe(&self, handler: Arc<dyn InvalidationHandler>) -> Result<Subscription> {
        let mut subscriber = self
            .client
            .subscribe(self.subject.clone())
            .await
            .map_err(|e| {
                Error::bus_with_source(
                    format!("Failed to subscribe to NATS subject '{}'", self.subject),
                    e,
                )
            })?;

        let subject = self.subject.clone();
        let delivery = async move {
            while let Some(message) = subscriber.next().await {
                deliver_payload(handler.as_ref(), &message.payload, "nats").await;
            }
            warn!("NATS subscription on '{}' ended", subject);
        };

        let (abort, registration) = AbortHandle::new_pair();
        tokio::spawn(Abortable::new(delivery, registration));
        Ok(Subscription::new(subscription_id("nats", &self.subject), abort))
    }

    fn channel(&self) -> &str {
        &self.subject
    }

    fn provider_name(&self) -> &str {
        "nats"
    }
}
