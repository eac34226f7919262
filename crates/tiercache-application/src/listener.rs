//! Invalidation Listener
//!
//! Receive side of the bus. Drops the local entries named by messages from
//! other nodes and ignores this node's own broadcasts. It never publishes,
//! so a received message cannot trigger another one.

use async_trait::async_trait;
use std::sync::Arc;
use tiercache_domain::error::Result;
use tiercache_domain::ports::{InvalidationHandler, LocalCache};
use tiercache_domain::{InvalidationMessage, NodeId};
use tracing::debug;

/// Applies remote invalidations to the local tier
///
/// Holds only the local cache and the node id, so subscribing it does not
/// keep the coordinator alive.
#[derive(Clone)]
pub struct InvalidationListener {
    local: Arc<dyn LocalCache>,
    node_id: NodeId,
}

impl InvalidationListener {
    pub fn new(local: Arc<dyn LocalCache>, node_id: NodeId) -> Self {
        Self { local, node_id }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Apply `message`; returns false when it was this node's own echo
    pub async fn apply(&self, message: &InvalidationMessage) -> bool {
        if message.is_from(&self.node_id) {
            debug!(origin = %message.origin_id, "Ignoring own invalidation");
            return false;
        }

        for namespace in &message.cache_names {
            match &message.key {
                Some(key) => {
                    self.local.invalidate(namespace, key).await;
                    debug!(namespace = %namespace, key = %key, origin = %message.origin_id, "Remote invalidation");
                }
                None => {
                    self.local.invalidate_all(namespace).await;
                    debug!(namespace = %namespace, origin = %message.origin_id, "Remote namespace invalidation");
                }
            }
        }
        true
    }
}

#[async_trait]
impl InvalidationHandler for InvalidationListener {
    async fn on_message(&self, message: InvalidationMessage) -> Result<()> {
        self.apply(&message).await;
        Ok(())
    }
}

impl std::fmt::Debug for InvalidationListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationListener")
            .field("node_id", &self.node_id)
            .field("local", &self.local.provider_name())
            .finish()
    }
}
