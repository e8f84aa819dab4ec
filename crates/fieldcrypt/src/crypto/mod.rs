//! AES-256-GCM field encryption primitives.
//!
//! This module is intentionally free of JSON and HTTP dependencies.
//! It provides the low-level seal/open operations used by [`crate::codec`].
//!
//! # Envelope format
//!
//! ```text
//! base64( salt[32] || iv[12] || tag[16] || ciphertext[..] )
//! ```
//!
//! The envelope carries no version prefix. Rows written before encryption was
//! rolled out are plain text, and telling the two apart relies on the base64
//! and minimum-length checks in [`envelope`].

pub mod cipher;
pub mod envelope;
pub mod kdf;

pub use cipher::{open_envelope, seal, CipherError};
pub use envelope::{Envelope, EnvelopeError, MIN_ENVELOPE_LEN};
pub use kdf::KEY_LEN;
