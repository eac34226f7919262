//! Cache Coordinator
//!
//! The orchestration core. Composes the remote backend, the optional near
//! tier (local cache + invalidation bus) and the background executor into
//! the read / write / delete protocols.
//!
//! ## Protocols
//!
//! | Operation | Steps |
//! |-----------|-------|
//! | `read` | local hit → return; else remote; a remote hit repopulates local |
//! | `write` | remote put (inline or submitted) → local put per namespace → one broadcast |
//! | `delete` | remote delete → local invalidate per namespace → one broadcast |
//! | `delete_all` | remote namespace drop → local table drop per namespace → one broadcast |
//!
//! The local write always happens on the caller's task, even in
//! [`WriteMode::Async`], so the writing node reads its own value back
//! immediately while the remote write catches up.
//!
//! ## Failure handling
//!
//! Cache mutation is best effort. A remote failure on write or delete is
//! logged and the call still succeeds; a remote failure on read is a miss.
//! Only argument errors, backpressure (`QueueFull`) and executor shutdown
//! reach the caller.
//!
//! ## Single-tier mode
//!
//! Built without [`near_tier`](CacheCoordinatorBuilder::near_tier), every
//! operation goes straight to the remote backend with no local cache and no
//! bus traffic.

use crate::listener::InvalidationListener;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{
    BoxTask, InvalidationBus, LocalCache, RemoteBackend, Subscription, TaskSubmitter,
};
use tiercache_domain::value_objects::{validate_namespace, validate_namespaces};
use tiercache_domain::{CacheKey, CacheValue, InvalidationMessage, NodeId};
use tracing::{debug, info, warn};

/// Whether the remote part of a mutation runs inline or on the executor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Wait for the remote store
    #[default]
    Sync,
    /// Hand the remote call to the executor and return
    Async,
}

#[derive(Clone)]
struct NearTier {
    local: Arc<dyn LocalCache>,
    bus: Arc<dyn InvalidationBus>,
}

/// Builder for [`CacheCoordinator`]
pub struct CacheCoordinatorBuilder {
    remote: Arc<dyn RemoteBackend>,
    near: Option<NearTier>,
    executor: Option<Arc<dyn TaskSubmitter>>,
    node_id: Option<NodeId>,
}

impl CacheCoordinatorBuilder {
    /// Enable the local tier and cross-node invalidation
    #[must_use]
    pub fn near_tier(mut self, local: Arc<dyn LocalCache>, bus: Arc<dyn InvalidationBus>) -> Self {
        self.near = Some(NearTier { local, bus });
        self
    }

    /// Executor for [`WriteMode::Async`] operations and background refreshes
    #[must_use]
    pub fn executor(mut self, executor: Arc<dyn TaskSubmitter>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Override the process-wide node id
    #[must_use]
    pub fn node_id(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
        self
    }

    pub fn build(self) -> CacheCoordinator {
        CacheCoordinator {
            remote: self.remote,
            near: self.near,
            executor: self.executor,
            node_id: self.node_id.unwrap_or_else(NodeId::process),
        }
    }
}

/// Two-tier cache coordinator
pub struct CacheCoordinator {
    remote: Arc<dyn RemoteBackend>,
    near: Option<NearTier>,
    executor: Option<Arc<dyn TaskSubmitter>>,
    node_id: NodeId,
}

impl CacheCoordinator {
    pub fn builder(remote: Arc<dyn RemoteBackend>) -> CacheCoordinatorBuilder {
        CacheCoordinatorBuilder {
            remote,
            near: None,
            executor: None,
            node_id: None,
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// True when the local tier and bus are active
    pub fn is_two_tier(&self) -> bool {
        self.near.is_some()
    }

    pub fn remote(&self) -> &Arc<dyn RemoteBackend> {
        &self.remote
    }

    pub fn local(&self) -> Option<&Arc<dyn LocalCache>> {
        self.near.as_ref().map(|near| &near.local)
    }

    /// Receive-side handler for this node, `None` in single-tier mode
    pub fn listener(&self) -> Option<InvalidationListener> {
        self.near
            .as_ref()
            .map(|near| InvalidationListener::new(Arc::clone(&near.local), self.node_id.clone()))
    }

    /// Subscribe this node's listener to the bus
    ///
    /// Returns `None` in single-tier mode. Delivery stops when the returned
    /// subscription is dropped.
    pub async fn start(&self) -> Result<Option<Subscription>> {
        let (Some(near), Some(listener)) = (&self.near, self.listener()) else {
            return Ok(None);
        };
        let subscription = near.bus.subscribe(Arc::new(listener)).await?;
        info!(
            node = %self.node_id,
            channel = near.bus.channel(),
            bus = near.bus.provider_name(),
            subscription = subscription.id(),
            "Invalidation listener started"
        );
        Ok(Some(subscription))
    }

    /// Apply an invalidation received from the bus
    pub async fn on_remote_message(&self, message: &InvalidationMessage) {
        if let Some(listener) = self.listener() {
            listener.apply(message).await;
        }
    }

    // ========================================================================
    // Read path
    // ========================================================================

    /// Look `key` up in `namespace`, local tier first
    ///
    /// A remote outage or an undecodable stored value is reported as a miss.
    pub async fn read(&self, namespace: &str, key: &CacheKey) -> Result<Option<CacheValue>> {
        validate_namespace(namespace)?;
        key.validate()?;

        if let Some(near) = &self.near {
            if let Some(hit) = near.local.get(namespace, key).await {
                debug!(namespace, key = %key, "Local hit");
                if hit.needs_refresh {
                    self.schedule_refresh(near, namespace, key);
                }
                return Ok(Some(hit.value));
            }
        }

        match self.remote.get(namespace, key).await {
            Ok(Some(value)) => {
                if let Some(near) = &self.near {
                    near.local.put(namespace, key, value.clone()).await;
                    debug!(namespace, key = %key, "Remote hit, local tier repopulated");
                } else {
                    debug!(namespace, key = %key, "Remote hit");
                }
                Ok(Some(value))
            }
            Ok(None) => {
                debug!(namespace, key = %key, "Cache miss");
                Ok(None)
            }
            Err(e) if e.is_invalid_argument() => Err(e),
            Err(e) => {
                warn!(namespace, key = %key, error = %e, "Remote read failed, treating as miss");
                Ok(None)
            }
        }
    }

    /// [`read`](Self::read) and decode the JSON payload
    ///
    /// A payload that does not decode as `T` is logged and treated as a miss.
    pub async fn read_as<T: DeserializeOwned>(
        &self,
        namespace: &str,
        key: &CacheKey,
    ) -> Result<Option<T>> {
        let Some(value) = self.read(namespace, key).await? else {
            return Ok(None);
        };
        match value.from_json() {
            Ok(typed) => Ok(Some(typed)),
            Err(e) => {
                warn!(namespace, key = %key, error = %e, "Cached value does not decode, treating as miss");
                Ok(None)
            }
        }
    }

    fn schedule_refresh(&self, near: &NearTier, namespace: &str, key: &CacheKey) {
        let Some(executor) = &self.executor else {
            debug!(namespace, key = %key, "Stale local entry, no executor for refresh");
            return;
        };
        let remote = Arc::clone(&self.remote);
        let local = Arc::clone(&near.local);
        let namespace = namespace.to_string();
        let key = key.clone();
        let task: BoxTask = Box::pin(async move {
            match remote.get(&namespace, &key).await {
                Ok(Some(value)) => local.put(&namespace, &key, value).await,
                Ok(None) => local.invalidate(&namespace, &key).await,
                Err(e) => warn!(namespace = %namespace, key = %key, error = %e, "Background refresh failed"),
            }
        });
        if let Err(e) = executor.submit(task) {
            warn!(error = %e, "Background refresh rejected");
        }
    }

    // ========================================================================
    // Write path
    // ========================================================================

    /// Store `value` under `key` in every namespace and tell peers
    ///
    /// `None` is a no-op. In [`WriteMode::Async`] a rejected submission is
    /// returned before anything is mutated.
    pub async fn write(
        &self,
        namespaces: &[String],
        key: &CacheKey,
        value: impl Into<Option<CacheValue>>,
        ttl: Duration,
        mode: WriteMode,
    ) -> Result<()> {
        validate_namespaces(namespaces)?;
        key.validate()?;
        let Some(value) = value.into() else {
            return Ok(());
        };

        match mode {
            WriteMode::Sync => {
                if let Err(e) = self.remote.put(namespaces, key, &value, ttl).await {
                    Self::mutation_failed("put", namespaces, e)?;
                }
            }
            WriteMode::Async => {
                let remote = Arc::clone(&self.remote);
                let (namespaces, key, value) = (namespaces.to_vec(), key.clone(), value.clone());
                self.submit("put", async move {
                    remote.put(&namespaces, &key, &value, ttl).await
                })?;
            }
        }

        if let Some(near) = &self.near {
            for namespace in namespaces {
                near.local.put(namespace, key, value.clone()).await;
            }
            self.broadcast(near, namespaces, Some(key.clone())).await;
        }
        Ok(())
    }

    /// Serialize `value` as JSON and [`write`](Self::write) it
    ///
    /// A value serializing to JSON `null` is not cached.
    pub async fn write_as<T: Serialize + ?Sized>(
        &self,
        namespaces: &[String],
        key: &CacheKey,
        value: &T,
        ttl: Duration,
        mode: WriteMode,
    ) -> Result<()> {
        let value = CacheValue::to_json(value)?;
        let value = (value.as_bytes() != b"null").then_some(value);
        self.write(namespaces, key, value, ttl, mode).await
    }

    /// Remove `key` from every namespace and tell peers
    pub async fn delete(&self, namespaces: &[String], key: &CacheKey, mode: WriteMode) -> Result<()> {
        validate_namespaces(namespaces)?;
        key.validate()?;

        match mode {
            WriteMode::Sync => {
                if let Err(e) = self.remote.delete(namespaces, key).await {
                    Self::mutation_failed("delete", namespaces, e)?;
                }
            }
            WriteMode::Async => {
                let remote = Arc::clone(&self.remote);
                let (namespaces, key) = (namespaces.to_vec(), key.clone());
                self.submit("delete", async move { remote.delete(&namespaces, &key).await })?;
            }
        }

        if let Some(near) = &self.near {
            for namespace in namespaces {
                near.local.invalidate(namespace, key).await;
            }
            self.broadcast(near, namespaces, Some(key.clone())).await;
        }
        Ok(())
    }

    /// Drop every listed namespace on both tiers and tell peers
    pub async fn delete_all(&self, namespaces: &[String], mode: WriteMode) -> Result<()> {
        validate_namespaces(namespaces)?;

        match mode {
            WriteMode::Sync => {
                if let Err(e) = self.remote.delete_all(namespaces).await {
                    Self::mutation_failed("delete_all", namespaces, e)?;
                }
            }
            WriteMode::Async => {
                let remote = Arc::clone(&self.remote);
                let namespaces = namespaces.to_vec();
                self.submit("delete_all", async move { remote.delete_all(&namespaces).await })?;
            }
        }

        if let Some(near) = &self.near {
            for namespace in namespaces {
                near.local.invalidate_all(namespace).await;
            }
            self.broadcast(near, namespaces, None).await;
        }
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Argument errors propagate; everything else is logged
    fn mutation_failed(operation: &str, namespaces: &[String], error: Error) -> Result<()> {
        if error.is_invalid_argument() {
            return Err(error);
        }
        warn!(operation, namespaces = ?namespaces, error = %error, "Remote cache mutation failed");
        Ok(())
    }

    fn submit<F>(&self, operation: &'static str, remote_call: F) -> Result<()>
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let executor = self.executor.as_ref().ok_or_else(|| {
            Error::configuration("Asynchronous cache operations need an executor")
        })?;
        executor.submit(Box::pin(async move {
            if let Err(e) = remote_call.await {
                warn!(operation, error = %e, "Background remote cache mutation failed");
            }
        }))
    }

    async fn broadcast(&self, near: &NearTier, namespaces: &[String], key: Option<CacheKey>) {
        let message = InvalidationMessage::new(self.node_id.clone(), namespaces.to_vec(), key);
        match near.bus.publish(&message).await {
            Ok(receivers) => debug!(namespaces = ?namespaces, receivers, "Invalidation published"),
            Err(e) => warn!(namespaces = ?namespaces, error = %e, "Invalidation publish failed"),
        }
    }
}

impl std::fmt::Debug for CacheCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCoordinator")
            .field("node_id", &self.node_id)
            .field("remote", &self.remote.provider_name())
            .field("local", &self.near.as_ref().map(|n| n.local.provider_name()))
            .field("bus", &self.near.as_ref().map(|n| n.bus.provider_name()))
            .field("async_enabled", &self.executor.is_some())
            .finish()
    }
}
