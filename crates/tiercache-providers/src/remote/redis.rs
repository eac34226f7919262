//! Redis remote backend
//!
//! Shared tier backed by Redis, single node or cluster.
//!
//! ## Layout
//!
//! | Concept | Redis |
//! |---------|-------|
//! | Namespace | One hash, named after the namespace |
//! | Entry | Hash field = key display form, value = envelope + codec bytes |
//! | Entry TTL | Expiry instant inside the envelope, checked on read |
//! | Namespace fallback expiry | `EXPIRE` on the hash, set by the first write |
//!
//! Every write runs one Lua script: `HSET`, then `EXPIRE` when the hash had
//! no expiry before the write. The check and the write are one atomic step,
//! so a namespace never exists without its fallback expiry, even when a
//! peer drops the hash or it expires between two writes.
//!
//! Expired envelopes are reported as misses and left in place; the
//! namespace expiry bounds how long they linger.
//!
//! ## Connections
//!
//! A fixed set of multiplexed connection slots used round-robin. `min_idle`
//! slots are opened by [`RedisRemoteBackend::connect`]; the rest open on
//! first use. Every command, including connection setup, is bounded by the
//! configured timeout.
//!
//! ## Example
//!
//! ```ignore
//! use tiercache_providers::{RedisBackendConfig, RedisRemoteBackend};
//!
//! let backend = RedisRemoteBackend::connect(RedisBackendConfig::single("localhost", 6379)).await?;
//! ```

use super::clock::expires_at;
use super::envelope::{self, is_expired};
use super::{validate_keyed, validate_lookup};
use crate::codec::IdentityCodec;
use crate::constants::{REDIS_DEFAULT_POOL_SIZE, REDIS_DEFAULT_PORT, REDIS_DEFAULT_TIMEOUT_MS};
use crate::remote::clock::{Clock, SystemClock};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::{Client, Cmd, FromRedisValue, RedisResult, Script, ScriptInvocation};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tiercache_domain::constants::DEFAULT_NAMESPACE_TTL_SECS;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{RemoteBackend, ValueCodec};
use tiercache_domain::value_objects::{validate_namespace, validate_namespaces};
use tiercache_domain::{CacheKey, CacheValue};
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// `KEYS[1]` namespace, `ARGV` field, envelope, fallback expiry in seconds.
/// Returns 1 when the write set the namespace expiry.
const PUT_SCRIPT: &str = r"
local ttl = redis.call('TTL', KEYS[1])
redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
if ttl < 0 then
  redis.call('EXPIRE', KEYS[1], ARGV[3])
  return 1
end
return 0
";

/// Where the Redis deployment lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedisEndpoint {
    /// Single server
    Single { host: String, port: u16 },
    /// Cluster seed nodes as `host:port`
    Cluster(Vec<String>),
}

/// Connection and layout settings for [`RedisRemoteBackend`]
#[derive(Debug, Clone)]
pub struct RedisBackendConfig {
    pub endpoint: RedisEndpoint,
    pub password: Option<String>,
    pub database: i64,
    pub pool_size: usize,
    pub min_idle: usize,
    pub timeout: Duration,
    /// Fallback expiry set on a namespace by its first write
    pub namespace_ttl: Duration,
}

impl RedisBackendConfig {
    pub fn single<S: Into<String>>(host: S, port: u16) -> Self {
        Self::with_endpoint(RedisEndpoint::Single {
            host: host.into(),
            port,
        })
    }

    pub fn cluster(nodes: Vec<String>) -> Self {
        Self::with_endpoint(RedisEndpoint::Cluster(nodes))
    }

    /// Parse `redis://[:password@]host[:port][/database]` into a single-node config
    pub fn from_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("redis://")
            .ok_or_else(|| Error::configuration(format!("Unsupported Redis URL: {url}")))?;
        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        let (credentials, address) = match authority.rsplit_once('@') {
            Some((credentials, address)) => (Some(credentials), address),
            None => (None, authority),
        };
        let (host, port) = match address.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse().map_err(|e| {
                    Error::configuration_with_source(format!("Invalid Redis port in {url}"), e)
                })?;
                (host, port)
            }
            None => (address, REDIS_DEFAULT_PORT),
        };

        let mut config = Self::single(host, port);
        // userinfo is `[username]:password`; a bare token is taken as the password
        config.password = credentials
            .map(|c| c.split_once(':').map_or(c, |(_, password)| password))
            .filter(|password| !password.is_empty())
            .map(str::to_string);
        let database = path.trim_end_matches('/');
        if !database.is_empty() {
            config.database = database.parse().map_err(|e| {
                Error::configuration_with_source(format!("Invalid Redis database in {url}"), e)
            })?;
        }
        Ok(config)
    }

    fn with_endpoint(endpoint: RedisEndpoint) -> Self {
        Self {
            endpoint,
            password: None,
            database: 0,
            pool_size: REDIS_DEFAULT_POOL_SIZE,
            min_idle: 1,
            timeout: Duration::from_millis(REDIS_DEFAULT_TIMEOUT_MS),
            namespace_ttl: Duration::from_secs(DEFAULT_NAMESPACE_TTL_SECS),
        }
    }

    /// `redis://` URL for a single node, credentials and database included
    pub fn single_url(host: &str, port: u16, password: Option<&str>, database: i64) -> String {
        match password {
            Some(password) => format!("redis://:{password}@{host}:{port}/{database}"),
            None => format!("redis://{host}:{port}/{database}"),
        }
    }
}

#[derive(Clone)]
enum RedisConnection {
    Single(ConnectionManager),
    Cluster(ClusterConnection),
}

impl RedisConnection {
    async fn query<T: FromRedisValue>(&mut self, cmd: &Cmd) -> RedisResult<T> {
        match self {
            Self::Single(conn) => cmd.query_async(conn).await,
            Self::Cluster(conn) => cmd.query_async(conn).await,
        }
    }

    async fn invoke<T: FromRedisValue>(
        &mut self,
        invocation: &ScriptInvocation<'_>,
    ) -> RedisResult<T> {
        match self {
            Self::Single(conn) => invocation.invoke_async(conn).await,
            Self::Cluster(conn) => invocation.invoke_async(conn).await,
        }
    }
}

enum RedisClient {
    Single(Client),
    Cluster(ClusterClient),
}

impl RedisClient {
    fn open(config: &RedisBackendConfig) -> Result<Self> {
        match &config.endpoint {
            RedisEndpoint::Single { host, port } => {
                let url = RedisBackendConfig::single_url(
                    host,
                    *port,
                    config.password.as_deref(),
                    config.database,
                );
                let client = Client::open(url).map_err(|e| {
                    Error::configuration_with_source("Failed to create Redis client", e)
                })?;
                Ok(Self::Single(client))
            }
            RedisEndpoint::Cluster(nodes) => {
                let urls: Vec<String> = nodes
                    .iter()
                    .map(|node| format!("redis://{node}"))
                    .collect();
                let mut builder = ClusterClient::builder(urls);
                if let Some(password) = &config.password {
                    builder = builder.password(password.clone());
                }
                let client = builder.build().map_err(|e| {
                    Error::configuration_with_source("Failed to create Redis cluster client", e)
                })?;
                Ok(Self::Cluster(client))
            }
        }
    }

    async fn connect(&self) -> RedisResult<RedisConnection> {
        match self {
            Self::Single(client) => Ok(RedisConnection::Single(
                client.get_connection_manager().await?,
            )),
            Self::Cluster(client) => Ok(RedisConnection::Cluster(
                client.get_async_connection().await?,
            )),
        }
    }
}

/// Redis remote backend
pub struct RedisRemoteBackend {
    client: RedisClient,
    slots: Vec<OnceCell<RedisConnection>>,
    next_slot: AtomicUsize,
    codec: Arc<dyn ValueCodec>,
    clock: Arc<dyn Clock>,
    put_script: Script,
    config: RedisBackendConfig,
}

impl RedisRemoteBackend {
    /// Build the backend and open `min_idle` connections
    ///
    /// Fails with BackendUnavailable when the eager connections cannot be
    /// opened within the timeout.
    pub async fn connect(config: RedisBackendConfig) -> Result<Self> {
        Self::connect_with_codec(config, Arc::new(IdentityCodec)).await
    }

    pub async fn connect_with_codec(
        config: RedisBackendConfig,
        codec: Arc<dyn ValueCodec>,
    ) -> Result<Self> {
        let backend = Self::lazy(config, codec)?;
        let eager = backend.config.min_idle.min(backend.slots.len());
        for slot in &backend.slots[..eager] {
            backend.open_slot(slot).await?;
        }
        info!(
            endpoint = ?backend.config.endpoint,
            pool_size = backend.slots.len(),
            eager,
            codec = backend.codec.name(),
            "Redis remote backend connected"
        );
        Ok(backend)
    }

    /// Build the backend without opening any connection
    pub fn lazy(config: RedisBackendConfig, codec: Arc<dyn ValueCodec>) -> Result<Self> {
        let client = RedisClient::open(&config)?;
        let slots = (0..config.pool_size.max(1)).map(|_| OnceCell::new()).collect();
        Ok(Self {
            client,
            slots,
            next_slot: AtomicUsize::new(0),
            codec,
            clock: Arc::new(SystemClock),
            put_script: Script::new(PUT_SCRIPT),
            config,
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &RedisBackendConfig {
        &self.config
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>> + Send,
    {
        match tokio::time::timeout(self.config.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(Error::backend_unavailable_with_source(
                format!("Redis {op} failed: {e}"),
                e,
            )),
            Err(_) => Err(Error::backend_unavailable(format!(
                "Redis {op} timed out after {}ms",
                self.config.timeout.as_millis()
            ))),
        }
    }

    async fn open_slot<'a>(&self, slot: &'a OnceCell<RedisConnection>) -> Result<&'a RedisConnection> {
        slot.get_or_try_init(|| self.bounded("connect", self.client.connect()))
            .await
    }

    async fn connection(&self) -> Result<RedisConnection> {
        let index = self.next_slot.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        Ok(self.open_slot(&self.slots[index]).await?.clone())
    }

    async fn execute<T: FromRedisValue + Send>(&self, op: &str, cmd: &Cmd) -> Result<T> {
        let mut conn = self.connection().await?;
        self.bounded(op, conn.query(cmd)).await
    }

    fn namespace_ttl_secs(&self) -> i64 {
        i64::try_from(self.config.namespace_ttl.as_secs().max(1)).unwrap_or(i64::MAX)
    }

    /// Remaining fallback expiry of a namespace; `None` when the hash is
    /// absent or has no expiry
    pub async fn namespace_expiry(&self, namespace: &str) -> Result<Option<Duration>> {
        validate_namespace(namespace)?;
        let ttl: i64 = self.execute("TTL", redis::cmd("TTL").arg(namespace)).await?;
        Ok(u64::try_from(ttl).ok().map(Duration::from_secs))
    }
}

#[async_trait]
impl RemoteBackend for RedisRemoteBackend {
    async fn get(&self, namespace: &str, key: &CacheKey) -> Result<Option<CacheValue>> {
        validate_lookup(namespace, key)?;
        let field = key.to_string();

        let stored: Option<Vec<u8>> = self
            .execute("HGET", redis::cmd("HGET").arg(namespace).arg(&field))
            .await?;
        let Some(stored) = stored else {
            return Ok(None);
        };

        let (expiry, body) = envelope::open(&stored)?;
        if is_expired(expiry, self.clock.now_millis()) {
            debug!(namespace, key = %field, "Remote entry expired");
            return Ok(None);
        }

        Ok(Some(CacheValue::from(self.codec.decode(body)?)))
    }

    async fn put(
        &self,
        namespaces: &[String],
        key: &CacheKey,
        value: &CacheValue,
        ttl: Duration,
    ) -> Result<()> {
        validate_keyed(namespaces, key)?;
        let field = key.to_string();
        let body = self.codec.encode(value.as_bytes())?;
        let sealed = envelope::seal(expires_at(self.clock.now_millis(), ttl), &body);

        let horizon = self.namespace_ttl_secs();
        for namespace in namespaces {
            let mut invocation = self.put_script.key(namespace);
            invocation.arg(&field).arg(&sealed).arg(horizon);
            let mut conn = self.connection().await?;
            let expiry_set: i64 = self.bounded("EVALSHA put", conn.invoke(&invocation)).await?;
            if expiry_set == 1 {
                debug!(namespace = %namespace, "First write set namespace expiry");
            }
        }
        Ok(())
    }

    async fn delete(&self, namespaces: &[String], key: &CacheKey) -> Result<()> {
        validate_keyed(namespaces, key)?;
        let field = key.to_string();
        for namespace in namespaces {
            let _: () = self
                .execute("HDEL", redis::cmd("HDEL").arg(namespace).arg(&field))
                .await?;
        }
        Ok(())
    }

    async fn delete_all(&self, namespaces: &[String]) -> Result<()> {
        validate_namespaces(namespaces)?;
        for namespace in namespaces {
            let _: () = self.execute("DEL", redis::cmd("DEL").arg(namespace)).await?;
        }
        Ok(())
    }

    async fn exists(&self, namespace: &str) -> Result<bool> {
        validate_namespace(namespace)?;
        self.execute("EXISTS", redis::cmd("EXISTS").arg(namespace))
            .await
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisRemoteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRemoteBackend")
            .field("endpoint", &self.config.endpoint)
            .field("pool_size", &self.slots.len())
            .field("codec", &self.codec.name())
            .field("timeout", &self.config.timeout)
            .finish()
    }
}
