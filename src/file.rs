//! In-place file encryption and decryption.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use zeroize::Zeroizing;

use crate::crypto::{decrypt_bytes, encrypt_bytes};
use crate::types::{EncrypterError, Key, Opened, Outcome, Sealed};

/// Atomically write data to a file using a temporary file.
///
/// This function ensures atomic writes by creating a temporary file in the same
/// directory as the target, writing data to it, and then atomically renaming
/// it to the target path. Until the rename the target is never touched.
///
/// # Arguments
///
/// * `path` - Target file path
/// * `data` - Data to write
/// * `permissions` - Permissions applied to the temporary file before the rename
/// * `overwrite` - Whether an existing target may be replaced
///
/// # Errors
///
/// Returns `EncrypterError::Io` for I/O failures (including `AlreadyExists` when
/// `overwrite` is false) or `EncrypterError::Invalid` for invalid paths.
pub fn write_all_atomic(
    path: &Path,
    data: &[u8],
    permissions: Option<fs::Permissions>,
    overwrite: bool,
) -> Result<(), EncrypterError> {
    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => return Err(EncrypterError::Invalid("target path has no parent")),
    };
    fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    if let Some(perms) = permissions {
        fs::set_permissions(tmp.path(), perms)?;
    }
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    if overwrite {
        tmp.persist(path).map_err(|e| EncrypterError::Io(e.error))?;
    } else {
        tmp.persist_noclobber(path)
            .map_err(|e| EncrypterError::Io(e.error))?;
    }
    Ok(())
}

/// Owner read/write only (0600 on Unix).
pub fn owner_only_permissions() -> Option<fs::Permissions> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(fs::Permissions::from_mode(0o600))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// Replace the contents of the file `path` refers to.
///
/// Symlinks are resolved first so the rename lands on the link target, not the link.
fn replace_contents(path: &Path, data: &[u8]) -> Result<(), EncrypterError> {
    let target = fs::canonicalize(path)?;
    let perms = fs::metadata(&target)?.permissions();
    write_all_atomic(&target, data, Some(perms), true)
}

/// Encrypt the file at `path` in place.
///
/// The whole file is read, sealed, and swapped in through [`write_all_atomic`]. A file
/// that already carries the magic marker is left untouched.
pub fn encrypt_file(key: &Key, path: &Path) -> Result<Outcome, EncrypterError> {
    let plaintext = Zeroizing::new(fs::read(path)?);
    match encrypt_bytes(key, &plaintext)? {
        Sealed::AlreadyEncrypted => Ok(Outcome::AlreadyEncrypted),
        Sealed::Encrypted(record) => {
            replace_contents(path, &record)?;
            Ok(Outcome::Encrypted)
        }
    }
}

/// Decrypt the file at `path` in place.
///
/// A file without the magic marker is left untouched. If authentication fails the
/// file is not modified.
pub fn decrypt_file(key: &Key, path: &Path) -> Result<Outcome, EncrypterError> {
    let record = fs::read(path)?;
    match decrypt_bytes(key, &record)? {
        Opened::NotEncrypted => Ok(Outcome::NotEncrypted),
        Opened::Decrypted(plaintext) => {
            replace_contents(path, &plaintext)?;
            Ok(Outcome::Decrypted)
        }
    }
}
