//! Field-level encryption at rest for PII columns.
//!
//! [`FieldCodec`] turns one plaintext column value into a base64 envelope and
//! back, passing through values that were stored before encryption existed.
//! The [`record`] helpers apply it to the sensitive fields of a JSON record.
//!
//! ```no_run
//! use fieldcrypt::{FieldCodec, MasterSecret};
//!
//! let codec = FieldCodec::new(MasterSecret::from_config(Some("passphrase")));
//! let stored = codec.encrypt(Some("HDFC0001234")).unwrap().unwrap();
//! assert_eq!(codec.decrypt(Some(stored.as_str())).as_deref(), Some("HDFC0001234"));
//! assert_eq!(codec.decrypt(Some("HDFC0001234")).as_deref(), Some("HDFC0001234"));
//! ```

pub mod codec;
pub mod crypto;
pub mod record;
pub mod secret;

pub use codec::{CodecError, FieldCodec, Opened};
pub use record::{decrypt_record, encrypt_record, BankDetails, DecryptReport, FieldSet};
pub use secret::{MasterSecret, SecretSource};
