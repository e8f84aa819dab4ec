//! In-memory cache of field profiles, keyed by profile name.
//!
//! Profiles are loaded at startup and refreshed on a configurable interval.
//! The cache uses `arc-swap` for lock-free reads on the request path.

use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;
use fieldcrypt::FieldSet;
use thiserror::Error;

/// Errors from the profile cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The requested profile name has no entry in the cache.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),
}

/// Shared, lock-free cache of field sets keyed by profile name.
///
/// Internally backed by [`ArcSwap`] so readers never block and the background
/// refresh task can atomically swap in a completely new map.
#[derive(Clone, Debug)]
pub struct ProfileCache {
    inner: Arc<ArcSwap<HashMap<String, Arc<FieldSet>>>>,
}

impl ProfileCache {
    /// Create a new, empty [`ProfileCache`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(HashMap::new()))),
        }
    }

    /// Return the number of profiles currently cached.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Return `true` if no profiles are cached.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    /// Look up a profile by name.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::UnknownProfile`] if `name` is not present.
    pub fn get(&self, name: &str) -> Result<Arc<FieldSet>, CacheError> {
        self.inner
            .load()
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::UnknownProfile(name.to_owned()))
    }

    /// Atomically replace the entire profile map.
    pub fn replace_all(&self, profiles: HashMap<String, FieldSet>) {
        let new_map: HashMap<String, Arc<FieldSet>> = profiles
            .into_iter()
            .map(|(name, fields)| (name, Arc::new(fields)))
            .collect();
        self.inner.store(Arc::new(new_map));
    }
}

impl Default for ProfileCache {
    fn default() -> Self {
        Self::new()
    }
}
