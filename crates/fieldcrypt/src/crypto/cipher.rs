//! AES-256-GCM sealing and opening of individual string fields.
//!
//! **Salt and IV are both random per call.** Two seals of the same plaintext
//! under the same master secret share neither key nor IV, so stored rows
//! cannot be correlated by ciphertext.

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use thiserror::Error;

use super::envelope::{Envelope, IV_LEN, TAG_LEN};
use super::kdf::{derive_key, SALT_LEN};

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The derived key was rejected by the cipher.
    #[error("invalid key length")]
    InvalidKeyLength,

    /// AES-GCM encryption or decryption failed.
    #[error("aead operation failed")]
    AeadFailure,
}

/// Seal `plaintext` under a key derived from `secret` and a fresh salt.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error (should be
/// unreachable for inputs shorter than the GCM message limit).
pub fn seal(plaintext: &[u8], secret: &[u8]) -> Result<Envelope, CipherError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(secret, &salt);
    let cipher =
        Aes256Gcm::new_from_slice(&key[..]).map_err(|_| CipherError::InvalidKeyLength)?;

    // aes-gcm appends the tag to the ciphertext; the envelope stores it first.
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| CipherError::AeadFailure)?;
    let tag_start = sealed.len() - TAG_LEN;
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&sealed[tag_start..]);
    sealed.truncate(tag_start);

    Ok(Envelope {
        salt,
        iv,
        tag,
        ciphertext: sealed,
    })
}

/// Open an [`Envelope`] back to plaintext bytes.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] if authentication fails (wrong secret
/// or tampered data).
pub fn open_envelope(envelope: &Envelope, secret: &[u8]) -> Result<Vec<u8>, CipherError> {
    let key = derive_key(secret, &envelope.salt);
    let cipher =
        Aes256Gcm::new_from_slice(&key[..]).map_err(|_| CipherError::InvalidKeyLength)?;

    let mut sealed = Vec::with_capacity(envelope.ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(&envelope.ciphertext);
    sealed.extend_from_slice(&envelope.tag);

    cipher
        .decrypt(Nonce::from_slice(&envelope.iv), sealed.as_ref())
        .map_err(|_| CipherError::AeadFailure)
}
