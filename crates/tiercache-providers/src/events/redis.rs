//! Redis Pub/Sub Invalidation Bus
//!
//! Publishes JSON-encoded invalidation messages on one Redis channel shared
//! by the whole fleet.
//!
//! ## Flow
//!
//! ```text
//! Node A: write(["orders"], 123)
//!   ↓
//! PUBLISH cache:redis:caffeine:topic {"originId":"A","cacheNames":["orders"],"key":123}
//!   ↓
//! Node A: listener ignores its own origin
//! Node B: listener drops orders/123 from its local tier
//! ```
//!
//! The first subscription is established before [`subscribe`] returns, so
//! a broken Redis is reported to the caller. If the connection drops later
//! the delivery task reconnects with exponential backoff.
//!
//! [`subscribe`]: InvalidationBus::subscribe

use super::{deliver_payload, subscription_id};
use crate::constants::{BUS_RECONNECT_INITIAL_BACKOFF, BUS_RECONNECT_MAX_BACKOFF};
use async_trait::async_trait;
use futures::StreamExt;
use futures::future::{AbortHandle, Abortable};
use redis::Client;
use redis::aio::{ConnectionManager, PubSub};
use std::sync::Arc;
use tiercache_domain::InvalidationMessage;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{InvalidationBus, InvalidationHandler, Subscription};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// Invalidation bus on Redis pub/sub
pub struct RedisInvalidationBus {
    client: Client,
    publisher: OnceCell<ConnectionManager>,
    channel: String,
}

impl RedisInvalidationBus {
    /// Create a bus on `channel`; connections open on first use
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `channel` - Pub/sub channel shared by every node
    pub fn new<S: Into<String>>(url: &str, channel: S) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| Error::configuration_with_source("Failed to create Redis client", e))?;
        Ok(Self {
            client,
            publisher: OnceCell::new(),
            channel: channel.into(),
        })
    }

    async fn publisher(&self) -> Result<ConnectionManager> {
        let conn = self
            .publisher
            .get_or_try_init(|| async {
                self.client
                    .get_connection_manager()
                    .await
                    .map_err(|e| Error::bus_with_source("Failed to connect Redis publisher", e))
            })
            .await?;
        Ok(conn.clone())
    }

    async fn open_pubsub(client: &Client, channel: &str) -> Result<PubSub> {
        let mut pubsub = client
            .get_async_pubsub()
            .await
            .map_err(|e| Error::bus_with_source("Failed to open Redis pub/sub connection", e))?;
        pubsub.subscribe(channel).await.map_err(|e| {
            Error::bus_with_source(format!("Failed to subscribe to Redis channel '{channel}'"), e)
        })?;
        Ok(pubsub)
    }
}

impl std::fmt::Debug for RedisInvalidationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisInvalidationBus")
            .field("channel", &self.channel)
            .field("publisher_connected", &self.publisher.initialized())
            .finish()
    }
}

#[async_trait]
impl InvalidationBus for RedisInvalidationBus {
    async fn publish(&self, message: &InvalidationMessage) -> Result<usize> {
        let payload = message.encode()?;
        let mut conn = self.publisher().await?;
        let receivers: i64 = redis::cmd("PUBLISH")
            .arg(&self.channel)
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                Error::bus_with_source(
                    format!("Failed to publish to Redis channel '{}'", self.channel),
                    e,
                )
            })?;
        debug!(channel = %self.channel, receivers, "Published invalidation");
        Ok(usize::try_from(receivers).unwrap_or_default())
    }

    async fn subscribe(&self, handler: Arc<dyn InvalidationHandler>) -> Result<Subscription> {
        let first = Self::open_pubsub(&self.client, &self.channel).await?;
        info!(channel = %self.channel, "Subscribed to Redis invalidation channel");

        let client = self.client.clone();
        let channel = self.channel.clone();
        let delivery = async move {
            let mut pubsub = Some(first);
            let mut backoff = BUS_RECONNECT_INITIAL_BACKOFF;
            loop {
                let connection = match pubsub.take() {
                    Some(connection) => connection,
                    None => match Self::open_pubsub(&client, &channel).await {
                        Ok(connection) => {
                            info!(channel = %channel, "Resubscribed to Redis invalidation channel");
                            backoff = BUS_RECONNECT_INITIAL_BACKOFF;
                            connection
                        }
                        Err(e) => {
                            error!(
                                channel = %channel,
                                error = %e,
                                backoff_secs = backoff.as_secs(),
                                "Redis invalidation subscription failed, retrying"
                            );
                            tokio::time::sleep(backoff).await;
                            backoff = (backoff * 2).min(BUS_RECONNECT_MAX_BACKOFF);
                            continue;
                        }
                    },
                };

                let mut messages = connection.into_on_message();
                while let Some(msg) = messages.next().await {
                    deliver_payload(handler.as_ref(), msg.get_payload_bytes(), "redis").await;
                }
                error!(channel = %channel, "Redis pub/sub connection closed");
            }
        };

        let (abort, registration) = AbortHandle::new_pair();
        tokio::spawn(Abortable::new(delivery, registration));
        Ok(Subscription::new(subscription_id("redis", &self.channel), abort))
    }

    fn channel(&self) -> &str {
        &self.channel
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}
