//! Request and response types exchanged with the field encryption sidecar.
//!
//! These types are serialised as JSON over the sidecar's HTTP API.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Encrypt / decrypt endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /encrypt` and `POST /decrypt`.
///
/// The `payload` field holds one record as a JSON object. Which of its fields
/// are sensitive is decided by the profile named in the `X-Field-Profile`
/// request header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldsRequest {
    /// Record whose sensitive fields are to be transformed.
    pub payload: serde_json::Value,
}

/// Successful response body for `POST /encrypt`.
///
/// The `payload` field mirrors the input with sensitive fields replaced by
/// base64 envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptResponse {
    /// Record with sensitive fields encrypted.
    pub payload: serde_json::Value,
}

/// Successful response body for `POST /decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    /// Record with sensitive fields decrypted. Fields that failed to
    /// authenticate are removed.
    pub payload: serde_json::Value,
    /// Paths of the removed fields, e.g. `"documents[1].document_number"`.
    #[serde(default)]
    pub omitted: Vec<String>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the master secret is a per-process random key.
    pub ephemeral_key: bool,
    /// Number of field profiles currently loaded.
    pub profiles_loaded: usize,
}
