//! Stored value envelope
//!
//! Layout: `[expires-at: u64 big-endian unix millis, 0 = never][body]`.
//! Hash fields carry no TTL of their own in Redis, so the entry expiry
//! travels with the value and is checked on read.

use crate::constants::ENVELOPE_HEADER_LEN;
use tiercache_domain::error::{Error, Result};

/// Wrap `body` with its expiry
pub fn seal(expires_at: Option<u64>, body: &[u8]) -> Vec<u8> {
    let mut sealed = Vec::with_capacity(ENVELOPE_HEADER_LEN + body.len());
    sealed.extend_from_slice(&expires_at.unwrap_or(0).to_be_bytes());
    sealed.extend_from_slice(body);
    sealed
}

/// Split a stored value into its expiry and body
pub fn open(stored: &[u8]) -> Result<(Option<u64>, &[u8])> {
    if stored.len() < ENVELOPE_HEADER_LEN {
        return Err(Error::codec(format!(
            "Stored value too short for envelope: {} bytes",
            stored.len()
        )));
    }
    let (header, body) = stored.split_at(ENVELOPE_HEADER_LEN);
    let mut raw = [0u8; ENVELOPE_HEADER_LEN];
    raw.copy_from_slice(header);
    let expires_at = match u64::from_be_bytes(raw) {
        0 => None,
        at => Some(at),
    };
    Ok((expires_at, body))
}

/// Whether an entry with `expires_at` is dead at `now`
pub fn is_expired(expires_at: Option<u64>, now: u64) -> bool {
    expires_at.is_some_and(|at| at <= now)
}
