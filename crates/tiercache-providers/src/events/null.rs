//! Null invalidation bus
//!
//! For single-node deployments: publishing goes nowhere and subscribers
//! never receive anything.

use async_trait::async_trait;
use futures::future::AbortHandle;
use std::sync::Arc;
use tiercache_domain::InvalidationMessage;
use tiercache_domain::error::Result;
use tiercache_domain::ports::{InvalidationBus, InvalidationHandler, Subscription};

/// Bus that drops every message
#[derive(Debug, Clone, Default)]
pub struct NullInvalidationBus;

impl NullInvalidationBus {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InvalidationBus for NullInvalidationBus {
    async fn publish(&self, _message: &InvalidationMessage) -> Result<usize> {
        Ok(0)
    }

    async fn subscribe(&self, _handler: Arc<dyn InvalidationHandler>) -> Result<Subscription> {
        let (abort, _registration) = AbortHandle::new_pair();
        Ok(Subscription::new(
            super::subscription_id("null", self.channel()),
            abort,
        ))
    }

    fn channel(&self) -> &str {
        ""
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}
