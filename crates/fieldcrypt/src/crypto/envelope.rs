//! Byte layout of a stored field envelope.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use super::kdf::SALT_LEN;

/// Byte length of an AES-GCM IV (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Byte length of an AES-GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Smallest decoded length a sealed envelope can have (empty ciphertext).
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + IV_LEN + TAG_LEN;

const IV_OFFSET: usize = SALT_LEN;
const TAG_OFFSET: usize = IV_OFFSET + IV_LEN;
const CIPHERTEXT_OFFSET: usize = TAG_OFFSET + TAG_LEN;

/// Reasons a stored string is not an envelope.
///
/// Neither variant means the data is corrupt: both are how legacy plaintext
/// rows present themselves.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The string is not standard padded base64.
    #[error("value is not base64")]
    NotBase64,

    /// The string is base64 but decodes to fewer than [`MIN_ENVELOPE_LEN`] bytes.
    #[error("decoded value is {0} bytes, shorter than an envelope")]
    TooShort(usize),
}

/// A parsed envelope: `salt || iv || tag || ciphertext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Per-value PBKDF2 salt.
    pub salt: [u8; SALT_LEN],
    /// AES-GCM IV.
    pub iv: [u8; IV_LEN],
    /// AES-GCM authentication tag.
    pub tag: [u8; TAG_LEN],
    /// Ciphertext without the tag.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Concatenate the regions in storage order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_ENVELOPE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Encode to the string stored in the database column.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Split a decoded buffer at the fixed region offsets.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::TooShort`] if `bytes` is shorter than
    /// [`MIN_ENVELOPE_LEN`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        if bytes.len() < MIN_ENVELOPE_LEN {
            return Err(EnvelopeError::TooShort(bytes.len()));
        }
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[..IV_OFFSET]);
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&bytes[IV_OFFSET..TAG_OFFSET]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[TAG_OFFSET..CIPHERTEXT_OFFSET]);

        Ok(Self {
            salt,
            iv,
            tag,
            ciphertext: bytes[CIPHERTEXT_OFFSET..].to_vec(),
        })
    }

    /// Parse a stored string back into an [`Envelope`].
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::NotBase64`] or [`EnvelopeError::TooShort`]
    /// when the string cannot be an envelope.
    pub fn from_base64(s: &str) -> Result<Self, EnvelopeError> {
        let bytes = STANDARD.decode(s).map_err(|_| EnvelopeError::NotBase64)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope {
            salt: [1u8; SALT_LEN],
            iv: [2u8; IV_LEN],
            tag: [3u8; TAG_LEN],
            ciphertext: vec![4, 5, 6],
        }
    }

    #[test]
    fn minimum_length_is_sixty() {
        assert_eq!(MIN_ENVELOPE_LEN, 60);
    }

    #[test]
    fn regions_land_at_fixed_offsets() {
        let bytes = sample().to_bytes();
        assert_eq!(bytes.len(), 63);
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[32], 2);
        assert_eq!(bytes[44], 3);
        assert_eq!(&bytes[60..], &[4, 5, 6]);
    }

    #[test]
    fn base64_repr_parses_back() {
        let env = sample();
        let parsed = Envelope::from_base64(&env.to_base64()).unwrap();
        assert_eq!(parsed, env);
    }

    #[test]
    fn plain_text_is_not_base64() {
        assert_eq!(
            Envelope::from_base64("HDFC Bank, Andheri"),
            Err(EnvelopeError::NotBase64)
        );
    }

    #[test]
    fn short_base64_is_too_short() {
        // "QUJDRA==" decodes to 4 bytes.
        assert_eq!(
            Envelope::from_base64("QUJDRA=="),
            Err(EnvelopeError::TooShort(4))
        );
    }

    #[test]
    fn empty_ciphertext_is_accepted() {
        let bytes = [0u8; MIN_ENVELOPE_LEN];
        let env = Envelope::from_bytes(&bytes).unwrap();
        assert!(env.ciphertext.is_empty());
    }
}
