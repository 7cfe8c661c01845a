use thiserror::Error;

pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors returned by the hashing and encryption primitives.
///
/// Variants fall into two classes: invalid arguments, which the caller has to
/// fix, and cryptographic failures, which can point at corrupted input, a
/// mismatched key pair or an unavailable random source. Use
/// [`CryptoError::is_invalid_argument`] to tell them apart.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("salt must be {expected} bytes long, got {actual}")]
    InvalidSaltLength { expected: usize, actual: usize },

    #[error("payload too large for this key: {len} bytes, at most {max} allowed")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("unsupported key length of {0} bits")]
    InvalidKeyLength(usize),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("OS random generator unavailable: {0}")]
    RandomUnavailable(#[from] getrandom::Error),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("failed to import key: {0}")]
    KeyImport(String),

    #[error("failed to export key: {0}")]
    KeyExport(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: wrong key or corrupted data")]
    Decryption,

    #[error("key derivation failed: {0}")]
    Derivation(String),
}

impl CryptoError {
    /// Returns `true` if the error was caused by the arguments of the call
    /// rather than by the cryptographic operation itself.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            CryptoError::InvalidSaltLength { .. }
                | CryptoError::PayloadTooLarge { .. }
                | CryptoError::InvalidKeyLength(_)
                | CryptoError::InvalidParameters(_)
        )
    }
}
