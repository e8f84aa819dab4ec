//! Typed bank-detail record for callers that bind rows to structs.

use serde::{Deserialize, Serialize};

use crate::codec::{CodecError, FieldCodec};

/// An employee's bank details as stored in, or read from, the database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifsc_code: Option<String>,
}

impl BankDetails {
    /// Encrypt every field, ready to persist. Blank fields become `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if any field fails to encrypt.
    pub fn seal(&self, codec: &FieldCodec) -> Result<Self, CodecError> {
        Ok(Self {
            bank_name: codec.encrypt(self.bank_name.as_deref())?,
            bank_account_number: codec.encrypt(self.bank_account_number.as_deref())?,
            ifsc_code: codec.encrypt(self.ifsc_code.as_deref())?,
        })
    }

    /// Decrypt a stored row. Fields that fail to authenticate become `None`;
    /// legacy plaintext and empty strings are kept as they are.
    pub fn open(&self, codec: &FieldCodec) -> Self {
        let read = |field: &Option<String>| match field.as_deref() {
            Some("") => Some(String::new()),
            other => codec.decrypt(other),
        };
        Self {
            bank_name: read(&self.bank_name),
            bank_account_number: read(&self.bank_account_number),
            ifsc_code: read(&self.ifsc_code),
        }
    }
}
