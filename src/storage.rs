//! Key files on disk.

use crate::asymmetric::KeyPair;
use crate::random::SecureRandomBytes;
use anyhow::{Context, Result, bail};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::Zeroizing;

const PUBLIC_FILE: &str = "public.der";
const PRIVATE_FILE: &str = "private.der";

/// A directory holding one DER encoded key pair.
///
/// Both key files are written to randomly named temporary files before
/// either is renamed over its target, so a crash leaves either the old or
/// the new key, never a partial one. If the public key cannot be put in
/// place, the previous private key is restored. On Unix the private key
/// file is created with mode `0600`.
#[derive(Debug, Clone)]
pub struct KeyStorage {
    dir: PathBuf,
}

impl KeyStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn public_path(&self) -> PathBuf {
        self.dir.join(PUBLIC_FILE)
    }

    pub fn private_path(&self) -> PathBuf {
        self.dir.join(PRIVATE_FILE)
    }

    /// Returns `true` if either key file exists.
    pub fn exists(&self) -> bool {
        self.public_path().exists() || self.private_path().exists()
    }

    /// Writes both keys, refusing to replace existing ones unless `force` is
    /// set.
    ///
    /// Both halves are written to temporary files before either is moved
    /// into place. If the public key cannot follow the private one, the
    /// previous private key is put back (or the new one removed), so the
    /// directory never holds two halves of different pairs.
    pub fn save_key_pair(&self, pair: &KeyPair, force: bool) -> Result<()> {
        if self.exists() && !force {
            bail!("key pair already exists in {}", self.dir.display());
        }

        let private_path = self.private_path();
        let public_path = self.public_path();
        let previous = read_if_exists(&private_path).context("failed to back up private key")?;

        let private_tmp =
            write_tmp(&private_path, &pair.private_key, true).context("failed to write private key")?;
        let public_tmp = match write_tmp(&public_path, &pair.public_key, false) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = fs::remove_file(&private_tmp);
                return Err(e.context("failed to write public key"));
            }
        };

        if let Err(e) = commit(&private_tmp, &private_path) {
            let _ = fs::remove_file(&public_tmp);
            return Err(e.context("failed to write private key"));
        }

        if let Err(e) = commit(&public_tmp, &public_path) {
            let restored = match &previous {
                Some(data) => write_tmp(&private_path, data, true)
                    .and_then(|tmp| commit(&tmp, &private_path)),
                None => fs::remove_file(&private_path).map_err(Into::into),
            };
            if let Err(restore) = restored {
                return Err(e.context(format!(
                    "failed to write public key; rolling back the private key failed too: {restore:#}"
                )));
            }
            return Err(e.context("failed to write public key"));
        }

        debug!(dir = %self.dir.display(), "saved key pair");
        Ok(())
    }

    pub fn load_public(&self) -> Result<Vec<u8>> {
        fs::read(self.public_path())
            .with_context(|| format!("failed to read {}", self.public_path().display()))
    }

    pub fn load_private(&self) -> Result<Zeroizing<Vec<u8>>> {
        fs::read(self.private_path())
            .map(Zeroizing::new)
            .with_context(|| format!("failed to read {}", self.private_path().display()))
    }
}

fn read_if_exists(path: &Path) -> Result<Option<Zeroizing<Vec<u8>>>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(Zeroizing::new(data))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Writes `data` to a fresh temporary file next to `path` and returns the
/// temporary path.
fn write_tmp(path: &Path, data: &[u8], secret: bool) -> Result<PathBuf> {
    let parent = path.parent().context("key path has no parent directory")?;
    fs::create_dir_all(parent)?;

    let tmp_path = random_tmp_path(path)?;

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if secret {
            options.mode(0o600);
        }
    }
    #[cfg(not(unix))]
    let _ = secret;

    let mut tmp_file = options
        .open(&tmp_path)
        .context("failed to create temporary file")?;
    let written = tmp_file.write_all(data).and_then(|_| tmp_file.sync_all());
    drop(tmp_file);
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(tmp_path)
}

/// Moves a temporary file over `path`, removing it if that fails.
fn commit(tmp_path: &Path, path: &Path) -> Result<()> {
    if let Err(e) = atomic_replace(tmp_path, path) {
        let _ = fs::remove_file(tmp_path);
        return Err(e);
    }

    let parent = path.parent().context("key path has no parent directory")?;
    File::open(parent)?.sync_all()?;
    Ok(())
}

/// `<name>.tmp.<16 hex chars>` next to `path`.
fn random_tmp_path(path: &Path) -> Result<PathBuf> {
    let suffix = hex::encode(SecureRandomBytes::array::<8>()?);
    let file_name = path
        .file_name()
        .context("key path has no file name")?
        .to_string_lossy();

    Ok(path.with_file_name(format!("{file_name}.tmp.{suffix}")))
}

/// Replaces `target` with `tmp_path` using `ReplaceFileW` with
/// `REPLACEFILE_WRITE_THROUGH`. Falls back to a rename for new files.
#[cfg(target_os = "windows")]
fn atomic_replace(tmp_path: &Path, target: &Path) -> Result<()> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

    if !target.exists() {
        fs::rename(tmp_path, target)?;
        return Ok(());
    }

    fn to_wide(s: &OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }

    let target_w = to_wide(target.as_os_str());
    let tmp_w = to_wide(tmp_path.as_os_str());

    // SAFETY: both strings are null-terminated UTF-16 that outlive the call,
    // and Windows does not keep the pointers.
    let result = unsafe {
        ReplaceFileW(
            target_w.as_ptr(),
            tmp_w.as_ptr(),
            std::ptr::null(),
            REPLACEFILE_WRITE_THROUGH,
            std::ptr::null(),
            std::ptr::null(),
        )
    };

    if result == 0 {
        let err = std::io::Error::last_os_error();
        return Err(err).context("atomic replace failed");
    }

    Ok(())
}

/// `rename()` is atomic when both paths are on the same filesystem.
#[cfg(not(target_os = "windows"))]
fn atomic_replace(tmp_path: &Path, target: &Path) -> Result<()> {
    fs::rename(tmp_path, target)?;
    Ok(())
}
