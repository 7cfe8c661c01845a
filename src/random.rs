//! Cryptographically secure random bytes.

use crate::error::{CryptoError, Result};
use tracing::trace;

/// Source of random bytes backed by the operating system CSPRNG.
///
/// There is no seed and no handle to the underlying generator, so output can
/// never be reproduced by a caller.
pub struct SecureRandomBytes;

impl SecureRandomBytes {
    /// Fill buffer with cryptographically secure random bytes
    pub fn fill(buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        trace!(len = buf.len(), "filling buffer from OS random source");
        getrandom::fill(buf).map_err(CryptoError::from)
    }

    /// Returns `length` random bytes.
    pub fn generate(length: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length];
        Self::fill(&mut buf)?;
        Ok(buf)
    }

    /// Returns a fixed-size array of random bytes.
    pub fn array<const N: usize>() -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        Self::fill(&mut buf)?;
        Ok(buf)
    }
}
