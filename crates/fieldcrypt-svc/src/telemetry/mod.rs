//! Tracing setup: structured JSON logs, plus OTLP span export when configured.
//!
//! # Telemetry invariants
//!
//! - **No field values or key material** may appear in any span attribute or
//!   log field. Field *paths* and counts are fine.
//! - Log level is configurable via `RUST_LOG`, falling back to `LOG_LEVEL`
//!   (default: `info`).

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
