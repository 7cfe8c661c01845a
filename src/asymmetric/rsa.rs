//! RSA with OAEP padding.
//!
//! Public keys are exchanged as DER encoded SubjectPublicKeyInfo, private keys
//! as DER encoded PKCS#8.

use super::{AsymmetricEncryption, KeyPair};
use crate::error::{CryptoError, Result};
use ::rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use ::rsa::traits::PublicKeyParts;
use ::rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use rand_core::OsRng;
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

/// Default key size in bits.
pub const KEY_LENGTH: usize = 4096;
/// Smallest accepted key size in bits.
pub const MIN_KEY_LENGTH: usize = 2048;
/// Largest accepted key size in bits.
pub const MAX_KEY_LENGTH: usize = 16384;
/// Size of an encoded 4096 bit public key with exponent 65537.
pub const PUBLIC_KEY_SIZE: usize = 550;
/// Upper bound for an encoded 4096 bit private key. Leading zero bytes in
/// the key components make the exact size vary between keys.
pub const PRIVATE_KEY_SIZE_MAX: usize = 2400;

/// Output size of SHA-256, the OAEP digest.
const OAEP_HASH_LEN: usize = 32;

/// Largest plaintext that fits into one OAEP block for a modulus of
/// `key_bytes` bytes.
pub const fn max_plaintext_len(key_bytes: usize) -> usize {
    key_bytes.saturating_sub(2 * OAEP_HASH_LEN + 2)
}

/// RSA-OAEP (SHA-256) encryption with 4096 bit keys by default.
#[derive(Debug, Clone, Copy)]
pub struct RsaEncryption {
    key_length: usize,
}

impl Default for RsaEncryption {
    fn default() -> Self {
        Self {
            key_length: KEY_LENGTH,
        }
    }
}

impl RsaEncryption {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses keys of `bits` bits for [`create_random_keys`].
    ///
    /// Only affects key generation; `encrypt` and `decrypt` work with any
    /// key in the accepted range.
    ///
    /// [`create_random_keys`]: AsymmetricEncryption::create_random_keys
    pub fn with_key_length(bits: usize) -> Result<Self> {
        check_key_length(bits)?;
        Ok(Self { key_length: bits })
    }

    pub fn key_length(&self) -> usize {
        self.key_length
    }
}

fn check_key_length(bits: usize) -> Result<()> {
    if !(MIN_KEY_LENGTH..=MAX_KEY_LENGTH).contains(&bits) || bits % 8 != 0 {
        return Err(CryptoError::InvalidKeyLength(bits));
    }
    Ok(())
}

fn import_public(der: &[u8]) -> Result<RsaPublicKey> {
    let key = RsaPublicKey::from_public_key_der(der)
        .map_err(|e| CryptoError::KeyImport(format!("public key: {e}")))?;
    check_key_length(key.size() * 8)?;
    Ok(key)
}

fn import_private(der: &[u8]) -> Result<RsaPrivateKey> {
    let key = RsaPrivateKey::from_pkcs8_der(der)
        .map_err(|e| CryptoError::KeyImport(format!("private key: {e}")))?;
    check_key_length(key.size() * 8)?;
    Ok(key)
}

impl AsymmetricEncryption for RsaEncryption {
    fn create_random_keys(&self) -> Result<KeyPair> {
        debug!(bits = self.key_length, "generating rsa key pair");

        let private = RsaPrivateKey::new(&mut OsRng, self.key_length)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        let public = RsaPublicKey::from(&private);

        let public_key = public
            .to_public_key_der()
            .map_err(|e| CryptoError::KeyExport(e.to_string()))?
            .as_bytes()
            .to_vec();
        let private_key = Zeroizing::new(
            private
                .to_pkcs8_der()
                .map_err(|e| CryptoError::KeyExport(e.to_string()))?
                .as_bytes()
                .to_vec(),
        );

        Ok(KeyPair {
            public_key,
            private_key,
        })
    }

    fn encrypt(&self, data: &[u8], public_key: &[u8]) -> Result<Vec<u8>> {
        let key = import_public(public_key)?;

        let max = max_plaintext_len(key.size());
        if data.len() > max {
            return Err(CryptoError::PayloadTooLarge {
                len: data.len(),
                max,
            });
        }

        debug!(len = data.len(), bits = key.size() * 8, "rsa-oaep encrypt");
        key.encrypt(&mut OsRng, Oaep::new::<Sha256>(), data)
            .map_err(|e| CryptoError::Encryption(e.to_string()))
    }

    fn decrypt(&self, ciphertext: &[u8], private_key: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let key = import_private(private_key)?;

        debug!(len = ciphertext.len(), bits = key.size() * 8, "rsa-oaep decrypt");
        let plaintext = key
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|_| CryptoError::Decryption)?;

        Ok(Zeroizing::new(plaintext))
    }
}
