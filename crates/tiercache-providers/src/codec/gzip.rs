//! Gzip codec
//!
//! Compresses values written to the remote tier. The local tier never sees
//! compressed bytes.

use crate::constants::CODEC_GZIP;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::ValueCodec;

/// Gzip codec backed by `flate2`
#[derive(Debug, Clone, Copy)]
pub struct GzipCodec {
    level: Compression,
}

impl GzipCodec {
    /// Create with an explicit compression level (0-9)
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }

    pub fn level(&self) -> u32 {
        self.level.level()
    }
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl ValueCodec for GzipCodec {
    fn encode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(payload.len() / 2), self.level);
        encoder
            .write_all(payload)
            .map_err(|e| Error::codec_with_source("Gzip compression failed", e))?;
        encoder
            .finish()
            .map_err(|e| Error::codec_with_source("Gzip compression failed", e))
    }

    fn decode(&self, stored: &[u8]) -> Result<Vec<u8>> {
        let mut decoded = Vec::with_capacity(stored.len() * 2);
        GzDecoder::new(stored)
            .read_to_end(&mut decoded)
            .map_err(|e| Error::codec_with_source("Gzip decompression failed", e))?;
        Ok(decoded)
    }

    fn name(&self) -> &str {
        CODEC_GZIP
    }
}
