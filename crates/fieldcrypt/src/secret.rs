//! [`MasterSecret`]: the process-wide input to key derivation.
//!
//! # Lifecycle
//!
//! 1. At startup the configured value is parsed once with [`MasterSecret::from_config`].
//! 2. A value of exactly 64 hex characters is taken as 32 raw key bytes; any
//!    other non-empty value is used as a passphrase (its UTF-8 bytes).
//! 3. When no value is configured a random 32-byte key is generated for this
//!    process only. Envelopes sealed under it cannot be opened after a restart,
//!    so the fallback is logged at `warn`.
//!
//! The secret bytes are never logged and are wiped on drop.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::KEY_LEN;

/// Where the current master secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// 64 hex characters decoded to a raw 32-byte key.
    HexKey,
    /// Arbitrary passphrase used verbatim.
    Passphrase,
    /// Nothing configured; random key valid for this process only.
    Ephemeral,
}

/// Master secret bytes plus their provenance.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterSecret {
    bytes: Vec<u8>,
    #[zeroize(skip)]
    source: SecretSource,
}

impl MasterSecret {
    /// Build the secret from the configured value.
    ///
    /// `None`, empty and whitespace-only values all count as "not configured".
    pub fn from_config(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Self::parse(v),
            None => {
                warn!(
                    "no master secret configured; using an ephemeral key, \
                     values encrypted now will be unreadable after restart"
                );
                Self::ephemeral()
            }
        }
    }

    /// Interpret a non-empty configured value as a hex key or a passphrase.
    pub fn parse(value: &str) -> Self {
        if value.len() == KEY_LEN * 2 {
            if let Ok(bytes) = hex::decode(value) {
                return Self {
                    bytes,
                    source: SecretSource::HexKey,
                };
            }
        }
        Self {
            bytes: value.as_bytes().to_vec(),
            source: SecretSource::Passphrase,
        }
    }

    /// Generate a random key that lives only as long as this process.
    pub fn ephemeral() -> Self {
        let mut bytes = vec![0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self {
            bytes,
            source: SecretSource::Ephemeral,
        }
    }

    /// Raw bytes fed to PBKDF2.
    pub fn expose(&self) -> &[u8] {
        &self.bytes
    }

    pub fn source(&self) -> SecretSource {
        self.source
    }

    /// `true` when data sealed now will not survive a restart.
    pub fn is_ephemeral(&self) -> bool {
        self.source == SecretSource::Ephemeral
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterSecret")
            .field("source", &self.source)
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
