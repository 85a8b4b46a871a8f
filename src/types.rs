//! Core types, constants and the library error.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use zeroize::Zeroizing;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// The symmetric file key. Zeroized on drop.
///
/// Length is not validated on construction: a key file may hold anything, and the
/// mismatch is reported when the key is first used for encryption.
#[derive(Clone, PartialEq, Eq)]
pub struct Key {
    bytes: Zeroizing<Vec<u8>>,
}

impl Key {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Result of [`encrypt_bytes`](crate::encrypt_bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sealed {
    /// The framed record, ready to be written over the plaintext.
    Encrypted(Vec<u8>),
    /// The input already carries the magic marker; nothing was done.
    AlreadyEncrypted,
}

/// Result of [`decrypt_bytes`](crate::decrypt_bytes).
#[derive(Clone, PartialEq, Eq)]
pub enum Opened {
    Decrypted(Zeroizing<Vec<u8>>),
    /// The input has no magic marker; nothing was done.
    NotEncrypted,
}

impl fmt::Debug for Opened {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opened::Decrypted(pt) => write!(f, "Decrypted({} bytes)", pt.len()),
            Opened::NotEncrypted => f.write_str("NotEncrypted"),
        }
    }
}

/// What an in-place file operation ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Encrypted,
    AlreadyEncrypted,
    Decrypted,
    NotEncrypted,
}

impl Outcome {
    /// The message shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::Encrypted => "Successfully encrypted file!",
            Outcome::AlreadyEncrypted => "File is already encrypted.",
            Outcome::Decrypted => "Successfully decrypted file!",
            Outcome::NotEncrypted => "Cannot decrypt a file that's not encrypted.",
        }
    }

    /// `true` when the file on disk was rewritten.
    pub fn modified(&self) -> bool {
        matches!(self, Outcome::Encrypted | Outcome::Decrypted)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Library error type (no panics for expected failures).
#[derive(Error, Debug)]
pub enum EncrypterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid key length: {0} (expected {KEY_LEN})")]
    KeyLength(usize),
    #[error("secure random source failed: {0}")]
    RandomSource(getrandom::Error),
    #[error("failed to initialize AES-256-GCM")]
    CipherInit,
    #[error("ciphertext too short: {0} bytes")]
    TruncatedCiphertext(usize),
    #[error("authentication failed: wrong key or tampered file")]
    Authentication,
    #[error("malformed encrypted file: {0}")]
    Malformed(&'static str),
    #[error("{} is not valid.", .0.display())]
    Selection(PathBuf),
    #[error("encryption key is not loaded yet")]
    KeyNotLoaded,
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
}
