//! PBKDF2 with a selectable HMAC pseudorandom function.
//!
//! Suitable for passwords; usually too slow for plain checksums.

use super::{HashWithSalt, check_salt};
use crate::error::Result;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use tracing::debug;

/// Length of the salt (24 bytes).
pub const SALT_LEN: usize = 24;
/// Length of the derived hash (128 bytes).
pub const HASH_LEN: usize = 128;

/// Pseudorandom function driving PBKDF2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Prf {
    HmacSha256,
    #[default]
    HmacSha512,
    /// Legacy choice. Only use it to check hashes produced by older systems.
    HmacSha1,
}

impl Prf {
    pub fn name(&self) -> &'static str {
        match self {
            Prf::HmacSha256 => "pbkdf2-sha256",
            Prf::HmacSha512 => "pbkdf2-sha512",
            Prf::HmacSha1 => "pbkdf2-sha1",
        }
    }

    /// Resolves a name produced by [`Prf::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        [Prf::HmacSha256, Prf::HmacSha512, Prf::HmacSha1]
            .into_iter()
            .find(|prf| prf.name() == name)
    }
}

/// PBKDF2 hashing with a 24 byte salt and a 128 byte output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pbkdf2Hash {
    prf: Prf,
}

impl Pbkdf2Hash {
    /// Creates a hasher using HMAC-SHA-512.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prf(prf: Prf) -> Self {
        Self { prf }
    }

    pub fn prf(&self) -> Prf {
        self.prf
    }
}

impl HashWithSalt for Pbkdf2Hash {
    fn algorithm(&self) -> &'static str {
        self.prf.name()
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

        debug!(prf = self.prf.name(), iterations, "deriving pbkdf2 hash");

        let mut out = vec![0u8; HASH_LEN];
        match self.prf {
            Prf::HmacSha256 => ::pbkdf2::pbkdf2_hmac::<Sha256>(data, salt, iterations, &mut out),
            Prf::HmacSha512 => ::pbkdf2::pbkdf2_hmac::<Sha512>(data, salt, iterations, &mut out),
            Prf::HmacSha1 => ::pbkdf2::pbkdf2_hmac::<Sha1>(data, salt, iterations, &mut out),
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptoError;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn hash_is_deterministic() {
        let hasher = Pbkdf2Hash::new();
        let salt = [42u8; SALT_LEN];

        let h1 = hasher.hash(b"password", &salt, 100).unwrap();
        let h2 = hasher.hash(b"password", &salt, 100).unwrap();

        assert_eq!(h1, h2);
        assert_eq!(h1.len(), HASH_LEN);
    }

    #[test]
    fn zero_iterations_returns_input() {
        let hasher = Pbkdf2Hash::new();
        let salt = hasher.generate_salt().unwrap();

        assert_eq!(hasher.hash(b"plain", &salt, 0).unwrap(), b"plain");
    }

    #[test]
    fn zero_iterations_still_checks_salt() {
        let hasher = Pbkdf2Hash::new();
        assert!(hasher.hash(b"plain", &[0u8; 3], 0).is_err());
    }

    #[test]
    fn wrong_salt_length_is_invalid_argument() {
        let hasher = Pbkdf2Hash::new();
        for len in [0, SALT_LEN - 1, SALT_LEN + 1, 64] {
            let err = hasher.hash(b"data", &vec![0u8; len], 1).unwrap_err();
            assert!(err.is_invalid_argument());
            assert!(matches!(
                err,
                CryptoError::InvalidSaltLength { expected: SALT_LEN, actual } if actual == len
            ));
        }
    }

    #[test]
    fn generated_salts_have_declared_length_and_do_not_repeat() {
        let hasher = Pbkdf2Hash::new();
        let salts: HashSet<Vec<u8>> = (0..1000)
            .map(|_| {
                let salt = hasher.generate_salt().unwrap();
                assert_eq!(salt.len(), SALT_LEN);
                salt
            })
            .collect();
        assert_eq!(salts.len(), 1000);
    }

    #[test]
    fn different_salts_give_different_hashes() {
        let hasher = Pbkdf2Hash::new();
        let h1 = hasher.hash(b"data", &[1u8; SALT_LEN], 1).unwrap();
        let h2 = hasher.hash(b"data", &[2u8; SALT_LEN], 1).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn iteration_count_affects_output() {
        let hasher = Pbkdf2Hash::new();
        let salt = [7u8; SALT_LEN];
        assert_ne!(
            hasher.hash(b"data", &salt, 1).unwrap(),
            hasher.hash(b"data", &salt, 2).unwrap()
        );
    }

    #[test]
    fn prf_affects_output() {
        let salt = [9u8; SALT_LEN];
        let outputs: HashSet<Vec<u8>> = [Prf::HmacSha256, Prf::HmacSha512, Prf::HmacSha1]
            .into_iter()
            .map(|prf| Pbkdf2Hash::with_prf(prf).hash(b"pw", &salt, 3).unwrap())
            .collect();
        assert_eq!(outputs.len(), 3);
    }

    #[test]
    fn prf_names_round_trip() {
        for prf in [Prf::HmacSha256, Prf::HmacSha512, Prf::HmacSha1] {
            assert_eq!(Prf::from_name(prf.name()), Some(prf));
        }
        assert_eq!(Prf::from_name("md5"), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn zero_iterations_is_identity(data in proptest::collection::vec(any::<u8>(), 0..256),
                                       salt in proptest::array::uniform24(any::<u8>())) {
            let hasher = Pbkdf2Hash::new();
            prop_assert_eq!(hasher.hash(&data, &salt, 0).unwrap(), data);
        }

        #[test]
        fn output_length_is_fixed(data in proptest::collection::vec(any::<u8>(), 0..256),
                                  salt in proptest::array::uniform24(any::<u8>()),
                                  iterations in 1u32..4) {
            let hasher = Pbkdf2Hash::new();
            let hash = hasher.hash(&data, &salt, iterations).unwrap();
            prop_assert_eq!(hash.len(), HASH_LEN);
            prop_assert_eq!(hash, hasher.hash(&data, &salt, iterations).unwrap());
        }
    }
}
