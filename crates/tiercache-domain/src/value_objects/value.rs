use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// Opaque cached payload
///
/// Clones share the same buffer; local and remote tiers each hold their own
/// copy of the bytes, never a mutable alias.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CacheValue(Arc<[u8]>);

impl CacheValue {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }

    /// Serialize a typed value as JSON
    pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::new(serde_json::to_vec(value)?))
    }

    /// Deserialize a JSON payload into a typed value
    pub fn from_json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.0)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for CacheValue {
    fn from(bytes: &[u8]) -> Self {
        Self(Arc::from(bytes))
    }
}

impl From<&str> for CacheValue {
    fn from(s: &str) -> Self {
        Self::from(s.as_bytes())
    }
}

impl fmt::Debug for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheValue")
            .field("len", &self.0.len())
            .finish()
    }
}
