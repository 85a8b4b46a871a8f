//! Loading and creating the local key file.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::crypto::generate_key;
use crate::file::{owner_only_permissions, write_all_atomic};
use crate::types::{EncrypterError, KEY_LEN, Key};

/// Read an existing key file.
///
/// A file of exactly [`KEY_LEN`] bytes is taken verbatim. Anything else has surrounding
/// ASCII whitespace trimmed first, so hand-written keys with a trailing newline load.
/// The length is not validated here.
pub fn load_key(path: &Path) -> Result<Key, EncrypterError> {
    let data = fs::read(path)?;
    Ok(key_from_file_contents(data))
}

fn key_from_file_contents(data: Vec<u8>) -> Key {
    if data.len() == KEY_LEN {
        Key::from_bytes(data)
    } else {
        Key::from_bytes(data.trim_ascii().to_vec())
    }
}

/// Write `key` to a new file at `path` (0600 on Unix). Never replaces an existing file.
pub fn save_key(path: &Path, key: &Key) -> Result<(), EncrypterError> {
    write_all_atomic(path, key.as_bytes(), owner_only_permissions(), false)
}

/// Load the key at `path`, or generate and persist a new one if the file is missing.
///
/// Only a missing file triggers generation; an unreadable key file is an error, never
/// a reason to overwrite it. If another writer creates the file between our read and
/// our write, their key wins and is returned.
pub fn load_or_create_key(path: &Path) -> Result<Key, EncrypterError> {
    match load_key(path) {
        Ok(key) => return Ok(key),
        Err(EncrypterError::Io(e)) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let key = generate_key()?;
    match save_key(path, &key) {
        Ok(()) => Ok(key),
        Err(EncrypterError::Io(e)) if e.kind() == ErrorKind::AlreadyExists => load_key(path),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_key_with_whitespace_edges_is_kept_verbatim() {
        let mut raw = vec![0xAB; KEY_LEN];
        raw[0] = b' ';
        raw[KEY_LEN - 1] = b'\n';
        let key = key_from_file_contents(raw.clone());
        assert_eq!(key.as_bytes(), raw.as_slice());
    }

    #[test]
    fn text_key_is_trimmed() {
        let key = key_from_file_contents(b"  0123456789abcdef0123456789abcdef\n".to_vec());
        assert_eq!(key.as_bytes(), b"0123456789abcdef0123456789abcdef");
    }
}
