//! Configuration loading and validation for the sidecar.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated sidecar configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Master secret: 64 hex characters or a passphrase. When absent an
    /// ephemeral per-process key is used.
    #[serde(default)]
    pub encryption_key: Option<String>,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// HTTP header used to identify which field profile to apply.
    #[serde(default = "default_profile_header")]
    pub profile_header_name: String,

    /// Optional YAML file overriding the built-in field profiles.
    #[serde(default)]
    pub field_profiles_path: Option<String>,

    /// How often (seconds) to reload the profile file.
    #[serde(default = "default_profile_refresh_interval")]
    pub profile_refresh_interval_secs: u64,

    /// OTLP endpoint. Spans are only exported when this is set.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_profile_header() -> String {
    "X-Field-Profile".into()
}
fn default_profile_refresh_interval() -> u64 {
    300
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.profile_header_name, "PROFILE_HEADER_NAME")?;
        if let Some(path) = &self.field_profiles_path {
            ensure_non_empty(path, "FIELD_PROFILES_PATH")?;
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        if self.profile_refresh_interval_secs == 0 {
            anyhow::bail!("PROFILE_REFRESH_INTERVAL_SECS must be > 0");
        }
        Ok(())
    }
}

// The master secret must never reach logs, even through `{:?}`.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("listen_port", &self.listen_port)
            .field("profile_header_name", &self.profile_header_name)
            .field("field_profiles_path", &self.field_profiles_path)
            .field(
                "profile_refresh_interval_secs",
                &self.profile_refresh_interval_secs,
            )
            .field(
                "otel_exporter_otlp_endpoint",
                &self.otel_exporter_otlp_endpoint,
            )
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty when set");
    }
    Ok(())
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Self {
            encryption_key: None,
            listen_port: default_listen_port(),
            profile_header_name: default_profile_header(),
            field_profiles_path: None,
            profile_refresh_interval_secs: default_profile_refresh_interval(),
            otel_exporter_otlp_endpoint: None,
            log_level: default_log_level(),
        }
    }
}
