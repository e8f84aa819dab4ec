//! `fieldcrypt-svc`: field encryption sidecar entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (JSON logs, optional OTLP export).
//! 3. Build the master secret and the [`FieldCodec`] around it.
//! 4. Load field profiles into [`ProfileCache`].
//! 5. Spawn the profile refresh task when a profile file is configured.
//! 6. Build the Axum router and start the server.

mod config;
mod profiles;
mod server;
mod telemetry;

use anyhow::{Context, Result};
use fieldcrypt::{FieldCodec, MasterSecret};
use tracing::info;

use config::Config;
use profiles::ProfileCache;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "fieldcrypt-svc starting"
    );

    // -----------------------------------------------------------------------
    // 3. Master secret
    // -----------------------------------------------------------------------
    let secret = MasterSecret::from_config(cfg.encryption_key.as_deref());
    info!(source = ?secret.source(), "master secret ready");
    let codec = FieldCodec::new(secret);

    // -----------------------------------------------------------------------
    // 4. Profile cache initialisation
    // -----------------------------------------------------------------------
    let profile_cache = ProfileCache::new();
    profiles::load_all(&cfg, &profile_cache).await?;

    // -----------------------------------------------------------------------
    // 5. Background tasks
    // -----------------------------------------------------------------------
    let _profile_refresh = cfg
        .field_profiles_path
        .is_some()
        .then(|| profiles::refresh_task(cfg.clone(), profile_cache.clone()));

    // -----------------------------------------------------------------------
    // 6. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(codec, profile_cache, cfg.profile_header_name.clone());
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("fieldcrypt-svc stopped");
    telemetry::shutdown_telemetry();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
