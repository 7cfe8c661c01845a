//! Storable form of a salted hash.

use super::argon2::{self, Argon2Hash, Argon2Params};
use super::pbkdf2::{Pbkdf2Hash, Prf};
use super::HashWithSalt;
use crate::error::{CryptoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Everything needed to verify data against a stored hash later on: the
/// algorithm, its cost parameters, the iteration count, salt and hash.
///
/// Salts are not secret and are kept in the clear next to the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRecord {
    algorithm: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<String, u32>,
    iterations: u32,
    #[serde(with = "hex_bytes")]
    salt: Vec<u8>,
    #[serde(with = "hex_bytes")]
    hash: Vec<u8>,
}

fn params_of(hasher: &dyn HashWithSalt) -> BTreeMap<String, u32> {
    hasher
        .parameters()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

impl HashRecord {
    /// Hashes `data` with a freshly generated salt.
    pub fn create(hasher: &dyn HashWithSalt, data: &[u8], iterations: u32) -> Result<Self> {
        let salt = hasher.generate_salt()?;
        Self::with_salt(hasher, data, salt, iterations)
    }

    /// Hashes `data` with a caller supplied salt.
    pub fn with_salt(
        hasher: &dyn HashWithSalt,
        data: &[u8],
        salt: Vec<u8>,
        iterations: u32,
    ) -> Result<Self> {
        let hash = hasher.hash(data, &salt, iterations)?;
        debug!(algorithm = hasher.algorithm(), iterations, "created hash record");

        Ok(Self {
            algorithm: hasher.algorithm().to_string(),
            params: params_of(hasher),
            iterations,
            salt,
            hash,
        })
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Cost parameters of the algorithm, empty for PBKDF2.
    pub fn params(&self) -> &BTreeMap<String, u32> {
        &self.params
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    fn param(&self, name: &str) -> Result<u32> {
        self.params.get(name).copied().ok_or_else(|| {
            CryptoError::InvalidParameters(format!(
                "record is missing {} parameter '{name}'",
                self.algorithm
            ))
        })
    }

    /// Rebuilds the hasher the record was created with.
    pub fn hasher(&self) -> Result<Box<dyn HashWithSalt>> {
        if let Some(prf) = Prf::from_name(&self.algorithm) {
            return Ok(Box::new(Pbkdf2Hash::with_prf(prf)));
        }

        if self.algorithm == argon2::ALGORITHM {
            let params = Argon2Params::new(
                self.param(argon2::PARAM_MEMORY)?,
                self.param(argon2::PARAM_PARALLELISM)?,
            )?;
            return Ok(Box::new(Argon2Hash::new(params)));
        }

        Err(CryptoError::InvalidParameters(format!(
            "unknown algorithm '{}'",
            self.algorithm
        )))
    }

    /// Checks `data` against the record using the algorithm and parameters
    /// stored in it.
    pub fn verify(&self, data: &[u8]) -> Result<bool> {
        self.verify_with(self.hasher()?.as_ref(), data)
    }

    /// Checks `data` against the record with an explicit hasher.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidParameters`] if `hasher` is not the
    /// algorithm, or does not have the parameters, the record was created
    /// with.
    pub fn verify_with(&self, hasher: &dyn HashWithSalt, data: &[u8]) -> Result<bool> {
        if hasher.algorithm() != self.algorithm {
            return Err(CryptoError::InvalidParameters(format!(
                "record uses {}, not {}",
                self.algorithm,
                hasher.algorithm()
            )));
        }
        let params = params_of(hasher);
        if params != self.params {
            return Err(CryptoError::InvalidParameters(format!(
                "record uses {} parameters {:?}, hasher has {:?}",
                self.algorithm, self.params, params
            )));
        }
        hasher.verify(data, &self.salt, self.iterations, &self.hash)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CryptoError::InvalidParameters(format!("hash record: {e}")))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CryptoError::InvalidParameters(format!("hash record: {e}")))
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(D::Error::custom)
    }
}
