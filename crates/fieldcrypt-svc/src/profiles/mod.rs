//! Field profile loading, parsing, and caching.
//!
//! # Responsibilities
//!
//! - Seed the cache with the built-in profiles, or load them from the YAML
//!   file named by `FIELD_PROFILES_PATH`.
//! - Re-read that file on a refresh interval so profile edits take effect
//!   without a restart.
//!
//! # Module invariants
//!
//! - **No crypto.** This module decides *which* fields are sensitive; it never
//!   touches field values or the master secret.

pub mod cache;

pub use cache::ProfileCache;

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use fieldcrypt::{record::builtin_profiles, FieldSet};
use serde::Deserialize;
use tokio::time;
use tracing::{info, warn};

use crate::config::Config;

/// On-disk profile file layout.
///
/// ```yaml
/// profiles:
///   bank_details: [bank_name, bank_account_number, ifsc_code]
///   vendor: [gst_number, "contacts[].phone"]
/// ```
#[derive(Debug, Deserialize)]
struct ProfileFile {
    profiles: BTreeMap<String, Vec<String>>,
}

/// Parse a YAML profile file into field sets.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, defines no profiles, or any
/// profile has an empty or invalid field list.
pub fn parse_profiles(text: &str) -> Result<HashMap<String, FieldSet>> {
    let file: ProfileFile = serde_yaml::from_str(text).context("profile file is not valid YAML")?;
    if file.profiles.is_empty() {
        anyhow::bail!("profile file defines no profiles");
    }

    file.profiles
        .into_iter()
        .map(|(name, paths)| -> Result<(String, FieldSet)> {
            let fields =
                FieldSet::new(&paths).with_context(|| format!("invalid profile {name:?}"))?;
            Ok((name, fields))
        })
        .collect()
}

/// Load profiles and atomically replace the cache.
///
/// Uses the built-in profiles when no file is configured.
///
/// # Errors
///
/// Returns an error if the configured file cannot be read or parsed.
pub async fn load_all(cfg: &Config, cache: &ProfileCache) -> Result<()> {
    let profiles = match &cfg.field_profiles_path {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read profile file {path}"))?;
            let parsed = parse_profiles(&text)
                .with_context(|| format!("failed to parse profile file {path}"))?;
            info!(path = %path, "loaded field profiles from file");
            parsed
        }
        None => builtin_profiles(),
    };

    cache.replace_all(profiles);
    info!(count = cache.len(), "profile cache refreshed");
    Ok(())
}

/// Spawn a background task that periodically reloads the profile file.
///
/// On reload failure the previous cache contents are retained and a warning is
/// emitted; the service continues to operate with stale profiles.
pub fn refresh_task(cfg: Config, cache: ProfileCache) -> tokio::task::JoinHandle<()> {
    let interval = std::time::Duration::from_secs(cfg.profile_refresh_interval_secs);
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // First tick fires immediately; the startup load already ran.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = load_all(&cfg, &cache).await {
                warn!(error = %e, "profile refresh failed; retaining previous profiles");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
profiles:
  bank_details: [bank_name, bank_account_number, ifsc_code]
  vendor:
    - gst_number
    - "contacts[].phone"
"#;

    #[test]
    fn parse_profiles_from_yaml() {
        let profiles = parse_profiles(YAML).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles["bank_details"].len(), 3);
        assert_eq!(profiles["vendor"].paths()[1].as_str(), "contacts[].phone");
    }

    #[test]
    fn parse_rejects_empty_profile() {
        assert!(parse_profiles("profiles:\n  vendor: []\n").is_err());
    }

    #[test]
    fn parse_rejects_invalid_path() {
        assert!(parse_profiles("profiles:\n  vendor: [\"contacts[]\"]\n").is_err());
    }

    #[test]
    fn parse_rejects_no_profiles() {
        assert!(parse_profiles("profiles: {}\n").is_err());
        assert!(parse_profiles("not: [valid").is_err());
    }

    #[tokio::test]
    async fn load_without_file_uses_builtins() {
        let cache = ProfileCache::new();
        load_all(&Config::default(), &cache).await.unwrap();
        assert_eq!(cache.len(), 3);
        assert!(cache.get("bank_details").is_ok());
    }

    #[tokio::test]
    async fn load_from_file_replaces_builtins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();
        let cfg = Config {
            field_profiles_path: Some(file.path().to_string_lossy().into_owned()),
            ..Config::default()
        };

        let cache = ProfileCache::new();
        load_all(&cfg, &cache).await.unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.get("vendor").is_ok());
        assert!(cache.get("employee").is_err());
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_profiles() {
        let cache = ProfileCache::new();
        load_all(&Config::default(), &cache).await.unwrap();

        let cfg = Config {
            field_profiles_path: Some("/nonexistent/profiles.yaml".into()),
            ..Config::default()
        };
        assert!(load_all(&cfg, &cache).await.is_err());
        assert_eq!(cache.len(), 3);
    }
}
