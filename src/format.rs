//! On-disk format: magic marker, separator and the base64 payload.
//!
//! ```text
//! ENCRYPTED\n<base64(nonce || ciphertext || tag)>\n
//! ```
//!
//! The base64 alphabet never contains `\n`, so the separator cannot collide with
//! the payload no matter what bytes the ciphertext holds.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use base64::{Engine, engine::general_purpose};

use crate::types::EncrypterError;

pub const MAGIC_MARKER: &[u8] = b"ENCRYPTED";
pub const SEPARATOR: u8 = b'\n';

/// `true` if `content` starts with the magic marker.
pub fn looks_encrypted(content: &[u8]) -> bool {
    content.starts_with(MAGIC_MARKER)
}

/// Check whether the file at `path` starts with the magic marker.
///
/// Only the first `MAGIC_MARKER.len()` bytes are read. A file shorter than the marker
/// is not encrypted.
///
/// # Errors
///
/// Returns `EncrypterError::Io` if the file cannot be opened or read. Callers that only
/// need a hint (e.g. a file listing) can fall back with `unwrap_or(false)`.
pub fn is_encrypted(path: &Path) -> Result<bool, EncrypterError> {
    let mut file = File::open(path)?;
    let mut header = [0u8; MAGIC_MARKER.len()];
    let mut filled = 0;
    while filled < header.len() {
        match file.read(&mut header[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(looks_encrypted(&header))
}

/// Wrap a raw `nonce || ciphertext || tag` payload into a record.
pub fn frame_payload(payload: &[u8]) -> Vec<u8> {
    let b64 = general_purpose::STANDARD.encode(payload);
    let mut out = Vec::with_capacity(MAGIC_MARKER.len() + b64.len() + 2);
    out.extend_from_slice(MAGIC_MARKER);
    out.push(SEPARATOR);
    out.extend_from_slice(b64.as_bytes());
    out.push(SEPARATOR);
    out
}

/// Extract the raw payload from a record.
///
/// Returns `Ok(None)` when `record` does not start with the magic marker.
///
/// # Errors
///
/// - `EncrypterError::Malformed` if the separator after the marker is missing.
/// - `EncrypterError::Authentication` if the body is not valid base64. A corrupted
///   body is reported the same way as a corrupted ciphertext.
pub fn unframe_payload(record: &[u8]) -> Result<Option<Vec<u8>>, EncrypterError> {
    let Some(rest) = record.strip_prefix(MAGIC_MARKER) else {
        return Ok(None);
    };
    let body = rest
        .strip_prefix(&[SEPARATOR])
        .ok_or(EncrypterError::Malformed("missing separator after marker"))?;
    general_purpose::STANDARD
        .decode(body.trim_ascii())
        .map(Some)
        .map_err(|_| EncrypterError::Authentication)
}
