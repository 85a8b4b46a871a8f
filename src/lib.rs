#![forbid(unsafe_code)]
//! # file_encrypter: in-place AES-256-GCM encryption for files picked in a terminal.
//!
//! The library holds everything except the terminal itself:
//!
//! - **Key store**: one 32-byte key, generated on first run and kept in a local file (0600).
//! - **Codec**: AES-256-GCM with a fresh 12-byte nonce per file, framed as
//!   `ENCRYPTED\n<base64(nonce || ciphertext || tag)>\n`.
//! - **In-place file operations** that go through a temp file and an atomic rename.
//! - **Controller**: the event-driven state machine behind the UI, plus the
//!   [`Operations`] runner that executes its effects on tokio.
//!
//! ## Example: Encrypt and decrypt a byte array
//! ```
//! use file_encrypter::{Key, Opened, Sealed, decrypt_bytes, encrypt_bytes};
//!
//! let key = Key::from_bytes(vec![42u8; 32]);
//! let Sealed::Encrypted(record) = encrypt_bytes(&key, b"hello").unwrap() else {
//!     unreachable!()
//! };
//! assert!(record.starts_with(b"ENCRYPTED\n"));
//!
//! match decrypt_bytes(&key, &record).unwrap() {
//!     Opened::Decrypted(pt) => assert_eq!(pt.as_slice(), b"hello"),
//!     Opened::NotEncrypted => unreachable!(),
//! }
//! ```
//!
//! Safety notes
//! - Not audited. The key sits next to the data in plain form; this protects files
//!   copied elsewhere without the key, nothing more.

mod types;
mod format;
mod crypto;
mod file;
mod keystore;
mod notify;
mod event;
mod controller;
mod operations;
mod browser;
mod config;

pub use types::*;
pub use format::{
    MAGIC_MARKER, SEPARATOR, frame_payload, is_encrypted, looks_encrypted, unframe_payload,
};
pub use crypto::{
    aead_decrypt, aead_encrypt, decrypt_bytes, encrypt_bytes, generate_key, generate_nonce,
};
pub use file::{decrypt_file, encrypt_file, owner_only_permissions, write_all_atomic};
pub use keystore::{load_key, load_or_create_key, save_key};
pub use notify::{
    Notification, NotificationBoard, NotificationId, NotificationKind, NotificationTimer,
};
pub use event::{AppEvent, Effect, OperationId};
pub use controller::{AppController, AppState, Command};
pub use operations::{Operations, read_preview};
pub use browser::{Entry, FileBrowser, Selection};
pub use config::{Config, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_KEY_FILE, DEFAULT_PREVIEW_LIMIT};

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Key {
        Key::from_bytes(vec![1u8; KEY_LEN])
    }

    #[test]
    fn round_trip_small() {
        let Sealed::Encrypted(ct) = encrypt_bytes(&key(), b"hi").unwrap() else {
            panic!("plaintext was treated as encrypted");
        };
        match decrypt_bytes(&key(), &ct).unwrap() {
            Opened::Decrypted(pt) => assert_eq!(pt.as_slice(), b"hi"),
            Opened::NotEncrypted => panic!("record lost its marker"),
        }
    }

    #[test]
    fn wrong_key_fails() {
        let Sealed::Encrypted(ct) = encrypt_bytes(&key(), b"data").unwrap() else {
            panic!("plaintext was treated as encrypted");
        };
        let other = Key::from_bytes(vec![2u8; KEY_LEN]);
        assert!(matches!(
            decrypt_bytes(&other, &ct),
            Err(EncrypterError::Authentication)
        ));
    }

    #[test]
    fn key_debug_is_redacted() {
        let key = Key::from_bytes(b"supersecretsupersecretsupersecre".to_vec());
        let shown = format!("{key:?}");
        assert!(!shown.contains("supersecret"));
        assert!(shown.contains("REDACTED"));
    }
}
