//! Public-key encryption.

pub mod rsa;

pub use self::rsa::RsaEncryption;

use crate::error::Result;
use std::fmt;
use zeroize::Zeroizing;

/// A matching public and private key, both in encoded form.
///
/// The private key is wiped from memory when the pair is dropped.
pub struct KeyPair {
    pub public_key: Vec<u8>,
    pub private_key: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(&self.public_key))
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// An asymmetric encryption scheme.
pub trait AsymmetricEncryption: Send + Sync {
    /// Generates a fresh, independent key pair.
    fn create_random_keys(&self) -> Result<KeyPair>;

    /// Encrypts `data` for the holder of the private key matching
    /// `public_key`.
    fn encrypt(&self, data: &[u8], public_key: &[u8]) -> Result<Vec<u8>>;

    /// Decrypts `ciphertext` produced by [`encrypt`](Self::encrypt).
    ///
    /// # Errors
    ///
    /// Fails with [`CryptoError::Decryption`](crate::CryptoError::Decryption)
    /// when `private_key` does not match the key used for encryption or the
    /// ciphertext was altered.
    fn decrypt(&self, ciphertext: &[u8], private_key: &[u8]) -> Result<Zeroizing<Vec<u8>>>;
}
