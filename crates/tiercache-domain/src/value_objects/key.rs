//! Cache keys and key generation
//!
//! A cacheable operation supplies its key parts as an ordered
//! [`KeyComponents`] list; a [`KeyStrategy`] turns that list into a
//! [`CacheKey`]. Order is significant: `[A, B]` and `[B, A]` are different
//! keys, so callers must push components in a canonical order.

use crate::constants::{HASH_KEY_BYTES, KEY_DELIMITER};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Key under which a value is stored in both tiers
///
/// Serialized untagged, so it travels on the invalidation wire as a plain
/// JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheKey {
    /// Fixed-width digest of the delimited components
    Hash(u64),
    /// Human-readable delimited components
    Text(String),
}

impl CacheKey {
    /// Reject keys that cannot address an entry
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Text(text) if text.is_empty() => {
                Err(Error::invalid_argument("Cache key can not be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hash(hash) => write!(f, "{hash}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<u64> for CacheKey {
    fn from(hash: u64) -> Self {
        Self::Hash(hash)
    }
}

/// Ordered list of key parts
///
/// Absent parts are kept in position but skipped when the key is built.
///
/// # Example
///
/// ```
/// use tiercache_domain::{KeyComponents, KeyStrategy, CacheKey};
///
/// let parts = KeyComponents::new().push("orders").push(123).push_opt(None::<u32>);
/// assert_eq!(parts.delimited(), ":orders:123:");
/// assert_eq!(
///     KeyStrategy::Concatenation.generate(&parts),
///     CacheKey::Text(":orders:123:".to_string())
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyComponents {
    parts: Vec<Option<String>>,
}

impl KeyComponents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a present component
    #[must_use]
    pub fn push<T: fmt::Display>(mut self, part: T) -> Self {
        self.parts.push(Some(part.to_string()));
        self
    }

    /// Append a component that may be absent
    #[must_use]
    pub fn push_opt<T: fmt::Display>(mut self, part: Option<T>) -> Self {
        self.parts.push(part.map(|p| p.to_string()));
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// `:`-delimited form: a leading delimiter, then every present part
    /// followed by a delimiter
    pub fn delimited(&self) -> String {
        let mut key = String::from(KEY_DELIMITER);
        for part in self.parts.iter().flatten() {
            key.push_str(part);
            key.push(KEY_DELIMITER);
        }
        key
    }
}

impl<T: fmt::Display> FromIterator<Option<T>> for KeyComponents {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        Self {
            parts: iter
                .into_iter()
                .map(|part| part.map(|p| p.to_string()))
                .collect(),
        }
    }
}

/// How components become a key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
    /// SHA-256 of the delimited form, first 8 bytes big-endian
    #[default]
    Hash,
    /// The delimited form itself, usable for prefix operations on the store
    Concatenation,
}

impl KeyStrategy {
    /// Build the key for `components`. Pure and deterministic.
    pub fn generate(self, components: &KeyComponents) -> CacheKey {
        let delimited = components.delimited();
        match self {
            Self::Hash => {
                let digest = Sha256::digest(delimited.as_bytes());
                let mut head = [0u8; HASH_KEY_BYTES];
                head.copy_from_slice(&digest[..HASH_KEY_BYTES]);
                CacheKey::Hash(u64::from_be_bytes(head))
            }
            Self::Concatenation => CacheKey::Text(delimited),
        }
    }
}
