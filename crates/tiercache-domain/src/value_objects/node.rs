use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static PROCESS_NODE_ID: LazyLock<NodeId> = LazyLock::new(NodeId::generate);

/// Opaque identity of a cache node
///
/// Every invalidation a node publishes carries its id as the origin, so the
/// node can recognise and ignore its own broadcasts when they come back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Identity of the current process, generated once on first use
    pub fn process() -> Self {
        PROCESS_NODE_ID.clone()
    }

    /// Fresh random identity
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
