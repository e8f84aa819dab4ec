//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::EncryptionFailure`] → 500
/// - [`ServiceError::Unavailable`] → 503
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: missing header, unknown profile, or a payload
    /// that is not a JSON object.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A field could not be encrypted. The write must not go ahead.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// No field profiles are loaded yet.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::EncryptionFailure(_) => 500,
            ServiceError::Unavailable(_) => 503,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Machine-readable code for the error response body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::EncryptionFailure(_) => "encryption_failed",
            ServiceError::Unavailable(_) => "service_unavailable",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// Message that is safe to return to the caller.
    ///
    /// Request errors echo their detail; crypto and internal errors collapse
    /// to a fixed string so cipher internals never reach an end user.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::BadRequest(msg) | ServiceError::Unavailable(msg) => msg.clone(),
            ServiceError::EncryptionFailure(_) => "encryption failed".into(),
            ServiceError::Internal(_) => "internal error".into(),
        }
    }
}
