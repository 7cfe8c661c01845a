//! Salted, iterated hashing for passwords and checksums.
//!
//! [`HashWithSalt`] is the capability callers depend on. [`Pbkdf2Hash`] and
//! [`Argon2Hash`] are the available algorithms.

pub mod argon2;
pub mod pbkdf2;
pub mod record;

pub use self::argon2::{Argon2Hash, Argon2Params};
pub use self::pbkdf2::{Pbkdf2Hash, Prf};
pub use self::record::HashRecord;

use crate::error::{CryptoError, Result};
use crate::random::SecureRandomBytes;
use subtle::ConstantTimeEq;

/// Iteration count used by [`HashWithSalt::hash_default`].
pub const DEFAULT_ITERATIONS: u32 = 1;

/// A salted hashing algorithm.
///
/// `hash` is deterministic for a given `(data, salt, iterations)`, which is
/// what makes verification by recomputation work.
///
/// An iteration count of `0` returns `data` unchanged. The short-circuit is
/// kept on purpose and covered by tests, but its output is not a hash and
/// must never be stored as one.
pub trait HashWithSalt: Send + Sync {
    /// Stable name of the algorithm, recorded next to stored hashes.
    fn algorithm(&self) -> &'static str;

    /// Number of salt bytes `hash` expects.
    fn salt_len(&self) -> usize;

    /// Number of bytes `hash` produces for a non-zero iteration count.
    fn hash_len(&self) -> usize;

    /// Hashes `data` with `salt`, running the algorithm `iterations` times.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSaltLength`] if `salt` is not exactly
    /// [`salt_len`](Self::salt_len) bytes long.
    fn hash(&self, data: &[u8], salt: &[u8], iterations: u32) -> Result<Vec<u8>>;

    /// Cost settings fixed at construction, as `(name, value)` pairs.
    ///
    /// Anything listed here must be stored with a hash to recompute it.
    fn parameters(&self) -> Vec<(&'static str, u32)> {
        Vec::new()
    }

    /// Generates a fresh random salt of [`salt_len`](Self::salt_len) bytes.
    fn generate_salt(&self) -> Result<Vec<u8>> {
        SecureRandomBytes::generate(self.salt_len())
    }

    /// Hashes with [`DEFAULT_ITERATIONS`].
    fn hash_default(&self, data: &[u8], salt: &[u8]) -> Result<Vec<u8>> {
        self.hash(data, salt, DEFAULT_ITERATIONS)
    }

    /// Recomputes the hash of `data` and compares it to `expected` in
    /// constant time.
    fn verify(&self, data: &[u8], salt: &[u8], iterations: u32, expected: &[u8]) -> Result<bool> {
        let actual = zeroize::Zeroizing::new(self.hash(data, salt, iterations)?);
        Ok(actual.as_slice().ct_eq(expected).into())
    }
}

/// Rejects salts whose length differs from what the algorithm declares.
pub(crate) fn check_salt(expected: usize, salt: &[u8]) -> Result<()> {
    if salt.len() != expected {
        return Err(CryptoError::InvalidSaltLength {
            expected,
            actual: salt.len(),
        });
    }
    Ok(())
}
