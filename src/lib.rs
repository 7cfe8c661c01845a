//! Salted password hashing and public-key encryption.
//!
//! Callers program against two capabilities:
//!
//! - [`HashWithSalt`], implemented by [`Pbkdf2Hash`] and [`Argon2Hash`]
//! - [`AsymmetricEncryption`], implemented by [`RsaEncryption`]
//!
//! ```no_run
//! use keyward::{HashWithSalt, Pbkdf2Hash};
//!
//! let hasher = Pbkdf2Hash::new();
//! let salt = hasher.generate_salt()?;
//! let hash = hasher.hash(b"hunter2", &salt, 210_000)?;
//! assert!(hasher.verify(b"hunter2", &salt, 210_000, &hash)?);
//! # Ok::<(), keyward::CryptoError>(())
//! ```
//!
//! All types are stateless and can be shared between threads.

pub mod asymmetric;
mod error;
pub mod hash;
mod random;
mod storage;

pub use crate::asymmetric::{AsymmetricEncryption, KeyPair, RsaEncryption};
pub use crate::error::{CryptoError, Result};
pub use crate::hash::{
    Argon2Hash, Argon2Params, DEFAULT_ITERATIONS, HashRecord, HashWithSalt, Pbkdf2Hash, Prf,
};
pub use crate::random::SecureRandomBytes;
pub use crate::storage::KeyStorage;

use anyhow::Context;
use directories::ProjectDirs;
use std::path::PathBuf;

/// Platform data directory used for key files when none is given.
pub fn default_key_dir() -> anyhow::Result<PathBuf> {
    let project_dirs =
        ProjectDirs::from("", "", "keyward").context("could not determine platform directories")?;

    Ok(project_dirs.data_dir().join("keys"))
}
