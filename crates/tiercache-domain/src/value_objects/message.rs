use crate::error::Result;
use crate::value_objects::{CacheKey, NodeId};
use serde::{Deserialize, Serialize};

/// "These namespaces changed" notice broadcast to every node
///
/// `key: None` means the whole namespaces were dropped. Wire form:
/// `{"originId": "...", "cacheNames": ["orders"], "key": 42}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationMessage {
    /// Node that published the message
    pub origin_id: NodeId,
    /// Affected namespaces, invalidated together
    pub cache_names: Vec<String>,
    /// Affected key, or every key when absent
    #[serde(default)]
    pub key: Option<CacheKey>,
}

impl InvalidationMessage {
    pub fn new(origin_id: NodeId, cache_names: Vec<String>, key: Option<CacheKey>) -> Self {
        Self {
            origin_id,
            cache_names,
            key,
        }
    }

    /// True when `node` published this message
    pub fn is_from(&self, node: &NodeId) -> bool {
        &self.origin_id == node
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}
