//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use fieldcrypt::{FieldCodec, MasterSecret};

use crate::profiles::ProfileCache;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or already `Arc`-backed) so
/// that Axum can clone the state for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// Field codec holding the process master secret.
    pub codec: FieldCodec,
    /// Lock-free cache of field profiles.
    pub profile_cache: ProfileCache,
    /// Name of the HTTP header used to identify the profile for each request.
    pub profile_header_name: Arc<String>,
}

impl AppState {
    /// Create a new [`AppState`] with the provided codec, cache and header name.
    pub fn new(codec: FieldCodec, profile_cache: ProfileCache, profile_header_name: String) -> Self {
        Self {
            codec,
            profile_cache,
            profile_header_name: Arc::new(profile_header_name),
        }
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`] with an ephemeral key and no profiles,
    /// suitable for tests.
    fn default() -> Self {
        Self::new(
            FieldCodec::new(MasterSecret::ephemeral()),
            ProfileCache::new(),
            "X-Field-Profile".into(),
        )
    }
}
