use crate::constants::CODEC_IDENTITY;
use tiercache_domain::error::Result;
use tiercache_domain::ports::ValueCodec;

/// Pass-through codec
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl ValueCodec for IdentityCodec {
    fn encode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        Ok(payload.to_vec())
    }

    fn decode(&self, stored: &[u8]) -> Result<Vec<u8>> {
        Ok(stored.to_vec())
    }

    fn name(&self) -> &str {
        CODEC_IDENTITY
    }
}
