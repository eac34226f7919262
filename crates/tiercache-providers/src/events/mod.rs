//! Invalidation Bus Implementations
//!
//! ## Available Providers
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | NullInvalidationBus | Single node | Discards all messages |
//! | TokioInvalidationBus | In-Process | Tokio broadcast channel |
//! | RedisInvalidationBus | Distributed | Redis pub/sub channel |
//! | NatsInvalidationBus | Distributed | NATS subject |
//!
//! ## Delivery boundary
//!
//! Every transport hands messages to its handler through [`deliver`]: the
//! handler runs inside a panic-catching boundary, failures are logged and
//! the delivery loop moves on to the next message.

#[cfg(feature = "bus-nats")]
pub mod nats;
pub mod null;
#[cfg(feature = "backend-redis")]
pub mod redis;
pub mod tokio;

#[cfg(feature = "bus-nats")]
pub use nats::NatsInvalidationBus;
pub use null::NullInvalidationBus;
#[cfg(feature = "backend-redis")]
pub use self::redis::RedisInvalidationBus;
pub use self::tokio::TokioInvalidationBus;

pub use tiercache_domain::ports::{InvalidationBus, InvalidationHandler, Subscription};

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tiercache_domain::InvalidationMessage;
use tracing::{error, warn};

/// Decode a raw payload and hand it to `handler`
///
/// Undecodable payloads are logged and dropped.
pub async fn deliver_payload(handler: &dyn InvalidationHandler, payload: &[u8], provider: &str) {
    match InvalidationMessage::decode(payload) {
        Ok(message) => deliver(handler, message, provider).await,
        Err(e) => warn!(provider, error = %e, "Dropping undecodable invalidation payload"),
    }
}

/// Run `handler` on one message, containing errors and panics
pub async fn deliver(handler: &dyn InvalidationHandler, message: InvalidationMessage, provider: &str) {
    let origin = message.origin_id.clone();
    match AssertUnwindSafe(handler.on_message(message))
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(provider, origin = %origin, error = %e, "Invalidation handler failed"),
        Err(_) => error!(provider, origin = %origin, "Invalidation handler panicked"),
    }
}

pub(crate) fn subscription_id(provider: &str, channel: &str) -> String {
    format!("{provider}-{channel}-{}", uuid::Uuid::new_v4())
}
