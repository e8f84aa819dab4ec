//! [`FieldCodec`]: string-in, string-out encryption of single column values.
//!
//! Reads must cope with three kinds of stored value:
//!
//! - envelopes written by [`FieldCodec::encrypt`],
//! - plain text written before encryption was rolled out,
//! - envelopes that no longer authenticate (rotated secret, corrupted row).
//!
//! [`FieldCodec::open`] reports which case applied; [`FieldCodec::decrypt`]
//! collapses it to `Option<String>` where legacy values come back unchanged and
//! authentication failures come back as `None`.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::crypto::{open_envelope, seal, CipherError, Envelope, EnvelopeError};
use crate::secret::MasterSecret;

/// Errors surfaced by [`FieldCodec::encrypt`].
///
/// Decryption has no error type: a value that fails to open is reported as
/// [`Opened::Failed`], never raised.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Sealing failed. The caller must abort the write rather than store plaintext.
    #[error("encryption failed: {0}")]
    Encryption(#[from] CipherError),
}

/// Outcome of reading one stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opened {
    /// The value was an envelope and authenticated.
    Decrypted(String),
    /// The value is not an envelope; it is returned unchanged.
    Legacy(String),
    /// The value is shaped like an envelope but did not authenticate, or the
    /// recovered bytes are not UTF-8.
    Failed,
}

impl Opened {
    /// Plaintext for the caller: the decrypted or legacy value, or `None` on failure.
    pub fn into_plaintext(self) -> Option<String> {
        match self {
            Opened::Decrypted(s) | Opened::Legacy(s) => Some(s),
            Opened::Failed => None,
        }
    }
}

/// Encrypts and decrypts individual field values under one master secret.
///
/// Cheap to clone; the secret is shared behind an `Arc`. Every call derives a
/// fresh key, so there is no cache to invalidate and no lock to take.
#[derive(Clone, Debug)]
pub struct FieldCodec {
    secret: Arc<MasterSecret>,
}

impl FieldCodec {
    pub fn new(secret: MasterSecret) -> Self {
        Self {
            secret: Arc::new(secret),
        }
    }

    /// The master secret this codec seals under.
    pub fn secret(&self) -> &MasterSecret {
        &self.secret
    }

    /// Encrypt one field value.
    ///
    /// `None`, empty and whitespace-only input return `Ok(None)` so the caller
    /// stores NULL.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encryption`] if the cipher fails.
    pub fn encrypt(&self, plaintext: Option<&str>) -> Result<Option<String>, CodecError> {
        match plaintext {
            Some(s) if !s.trim().is_empty() => self.encrypt_str(s).map(Some),
            _ => Ok(None),
        }
    }

    /// Encrypt a value already known to be non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encryption`] if the cipher fails.
    pub fn encrypt_str(&self, plaintext: &str) -> Result<String, CodecError> {
        let envelope = seal(plaintext.as_bytes(), self.secret.expose())?;
        Ok(envelope.to_base64())
    }

    /// Decrypt one stored value.
    ///
    /// Returns `None` for `None` or empty input and for envelopes that fail to
    /// authenticate. Legacy plaintext is returned unchanged.
    pub fn decrypt(&self, stored: Option<&str>) -> Option<String> {
        match stored {
            Some(s) if !s.is_empty() => self.open(s).into_plaintext(),
            _ => None,
        }
    }

    /// Classify and, where possible, decrypt one stored value.
    pub fn open(&self, stored: &str) -> Opened {
        let envelope = match Envelope::from_base64(stored) {
            Ok(env) => env,
            Err(EnvelopeError::NotBase64) => return Opened::Legacy(stored.to_owned()),
            Err(EnvelopeError::TooShort(len)) => {
                // Valid base64 that is too short may be another scheme's output.
                warn!(decoded_len = len, "base64 value too short for an envelope; treating as plaintext");
                return Opened::Legacy(stored.to_owned());
            }
        };

        let bytes = match open_envelope(&envelope, self.secret.expose()) {
            Ok(b) => b,
            Err(e) => {
                debug!(error = %e, "envelope failed to authenticate");
                return Opened::Failed;
            }
        };

        match String::from_utf8(bytes) {
            Ok(s) => Opened::Decrypted(s),
            Err(_) => {
                debug!("decrypted field is not valid UTF-8");
                Opened::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn codec() -> FieldCodec {
        FieldCodec::new(MasterSecret::parse("codec unit tests"))
    }

    #[test]
    fn blank_input_encrypts_to_none() {
        let c = codec();
        assert_eq!(c.encrypt(None).unwrap(), None);
        assert_eq!(c.encrypt(Some("")).unwrap(), None);
        assert_eq!(c.encrypt(Some(" \t ")).unwrap(), None);
    }

    #[test]
    fn blank_input_decrypts_to_none() {
        let c = codec();
        assert_eq!(c.decrypt(None), None);
        assert_eq!(c.decrypt(Some("")), None);
    }

    #[test]
    fn round_trip_preserves_surrounding_whitespace() {
        let c = codec();
        let sealed = c.encrypt(Some("  SBIN0000001 ")).unwrap().unwrap();
        assert_eq!(c.decrypt(Some(sealed.as_str())).as_deref(), Some("  SBIN0000001 "));
    }

    #[test]
    fn open_classifies_envelope() {
        let c = codec();
        let sealed = c.encrypt_str("A1234567").unwrap();
        assert_eq!(c.open(&sealed), Opened::Decrypted("A1234567".into()));
    }

    #[test]
    fn open_classifies_legacy() {
        let c = codec();
        assert_eq!(c.open("State Bank"), Opened::Legacy("State Bank".into()));
        assert_eq!(c.open("QUJDRA=="), Opened::Legacy("QUJDRA==".into()));
    }

    #[test]
    fn long_base64_garbage_fails() {
        let c = codec();
        let garbage = STANDARD.encode([0x5Au8; 80]);
        assert_eq!(c.open(&garbage), Opened::Failed);
        assert_eq!(c.decrypt(Some(garbage.as_str())), None);
    }

    #[test]
    fn non_utf8_plaintext_is_a_failure() {
        let c = codec();
        let env = seal(&[0xFF, 0xFE, 0xFD], c.secret().expose()).unwrap();
        assert_eq!(c.open(&env.to_base64()), Opened::Failed);
    }

    #[test]
    fn multibyte_text_round_trips() {
        let c = codec();
        let sealed = c.encrypt_str("बैंक ऑफ़ बड़ौदा").unwrap();
        assert_eq!(c.decrypt(Some(sealed.as_str())).as_deref(), Some("बैंक ऑफ़ बड़ौदा"));
    }
}
