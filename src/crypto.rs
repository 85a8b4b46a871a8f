//! Core encryption and decryption primitives.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use getrandom::fill as getrandom;

use crate::format::{frame_payload, looks_encrypted, unframe_payload};
use crate::types::{EncrypterError, KEY_LEN, Key, NONCE_LEN, Opened, Sealed};

/// Generate a cryptographically secure random nonce.
pub fn generate_nonce() -> Result<[u8; NONCE_LEN], EncrypterError> {
    let mut nonce = [0u8; NONCE_LEN];
    getrandom(&mut nonce).map_err(EncrypterError::RandomSource)?;
    Ok(nonce)
}

/// Generate a fresh random 256-bit key.
pub fn generate_key() -> Result<Key, EncrypterError> {
    let mut bytes = vec![0u8; KEY_LEN];
    getrandom(&mut bytes).map_err(EncrypterError::RandomSource)?;
    Ok(Key::from_bytes(bytes))
}

fn cipher_for(key: &Key) -> Result<Aes256Gcm, EncrypterError> {
    Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| EncrypterError::CipherInit)
}

/// Seal `plaintext` under `key` with the given nonce and no associated data.
///
/// # Returns
///
/// `nonce || ciphertext || tag`
pub fn aead_encrypt(
    key: &Key,
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, EncrypterError> {
    let cipher = cipher_for(key)?;
    let sealed = cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| EncrypterError::CipherInit)?;
    let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
    out.extend_from_slice(nonce);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Open a `nonce || ciphertext || tag` payload.
///
/// # Errors
///
/// - `EncrypterError::TruncatedCiphertext` if the payload is shorter than a nonce.
/// - `EncrypterError::Authentication` if the tag does not verify (wrong key or tampering).
pub fn aead_decrypt(key: &Key, payload: &[u8]) -> Result<Vec<u8>, EncrypterError> {
    if payload.len() < NONCE_LEN {
        return Err(EncrypterError::TruncatedCiphertext(payload.len()));
    }
    let cipher = cipher_for(key)?;
    let (nonce, body) = payload.split_at(NONCE_LEN);
    cipher
        .decrypt(Nonce::from_slice(nonce), body)
        .map_err(|_| EncrypterError::Authentication)
}

/// Encrypt a byte slice into a framed record.
///
/// Input that already starts with the magic marker is left alone and reported as
/// [`Sealed::AlreadyEncrypted`], so a file is never wrapped twice.
///
/// # Errors
///
/// `KeyLength` if `key` is not 32 bytes, `RandomSource` if no nonce can be drawn.
pub fn encrypt_bytes(key: &Key, plaintext: &[u8]) -> Result<Sealed, EncrypterError> {
    if looks_encrypted(plaintext) {
        return Ok(Sealed::AlreadyEncrypted);
    }
    if key.len() != KEY_LEN {
        return Err(EncrypterError::KeyLength(key.len()));
    }
    let nonce = generate_nonce()?;
    let payload = aead_encrypt(key, &nonce, plaintext)?;
    Ok(Sealed::Encrypted(frame_payload(&payload)))
}

/// Decrypt a framed record.
///
/// Input without the magic marker is reported as [`Opened::NotEncrypted`]. On any error
/// no plaintext is returned.
pub fn decrypt_bytes(key: &Key, record: &[u8]) -> Result<Opened, EncrypterError> {
    let Some(payload) = unframe_payload(record)? else {
        return Ok(Opened::NotEncrypted);
    };
    let plaintext = aead_decrypt(key, &payload)?;
    Ok(Opened::Decrypted(plaintext.into()))
}
