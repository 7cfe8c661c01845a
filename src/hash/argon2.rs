//! Argon2id, a memory-hard alternative to PBKDF2.

use super::{HashWithSalt, check_salt};
use crate::error::{CryptoError, Result};
use ::argon2::{Algorithm, Argon2, Params, Version};
use tracing::debug;

/// Name recorded next to stored hashes.
pub const ALGORITHM: &str = "argon2id";
/// Record parameter holding the memory cost in KiB.
pub const PARAM_MEMORY: &str = "m";
/// Record parameter holding the number of lanes.
pub const PARAM_PARALLELISM: &str = "p";

/// Length of the salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the derived hash (32 bytes).
pub const HASH_LEN: usize = 32;

/// Memory and lane settings. The iteration count passed to
/// [`HashWithSalt::hash`] becomes the Argon2 time cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    mem_cost_kib: u32,
    parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            mem_cost_kib: 64 * 1024, // 64 MiB
            parallelism: 1,
        }
    }
}

impl Argon2Params {
    pub fn new(mem_cost_kib: u32, parallelism: u32) -> Result<Self> {
        let params = Self {
            mem_cost_kib,
            parallelism,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn mem_cost_kib(&self) -> u32 {
        self.mem_cost_kib
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn validate(&self) -> Result<()> {
        if self.mem_cost_kib < 8 {
            return Err(invalid("argon2 memory cost too low"));
        }
        if self.parallelism < 1 {
            return Err(invalid("argon2 parallelism must be >= 1"));
        }
        if self.mem_cost_kib < 8 * self.parallelism {
            return Err(invalid(
                "argon2 memory cost must be at least 8 * parallelism",
            ));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> CryptoError {
    CryptoError::InvalidParameters(msg.to_string())
}

/// Argon2id (version 0x13) hashing with a 16 byte salt and a 32 byte output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hash {
    params: Argon2Params,
}

impl Argon2Hash {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Argon2Params {
        &self.params
    }
}

impl HashWithSalt for Argon2Hash {
    fn algorithm(&self) -> &'static str {
        ALGORITHM
    }

    fn parameters(&self) -> Vec<(&'static str, u32)> {
        vec![
            (PARAM_MEMORY, self.params.mem_cost_kib),
            (PARAM_PARALLELISM, self.params.parallelism),
        ]
    }

    fn salt_len(&self) -> usize {
        SALT_LEN
    }

    fn hash_len(&self) -> usize {
        HASH_LEN
    }

    fn hash(&self, data: &[u8], salt: &[u8], iterations: u32) -> Result<Vec<u8>> {
        check_salt(SALT_LEN, salt)?;

        if iterations == 0 {
            return Ok(data.to_vec());
        }

        self.params.validate()?;
        debug!(
            mem_cost_kib = self.params.mem_cost_kib,
            parallelism = self.params.parallelism,
            iterations,
            "deriving argon2id hash"
        );

        let params = Params::new(
            self.params.mem_cost_kib,
            iterations,
            self.params.parallelism,
            Some(HASH_LEN),
        )
        .map_err(|e| CryptoError::InvalidParameters(format!("argon2: {e}")))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut out = vec![0u8; HASH_LEN];
        argon2
            .hash_password_into(data, salt, &mut out)
            .map_err(|e| CryptoError::Derivation(format!("argon2: {e}")))?;

        Ok(out)
    }
}
