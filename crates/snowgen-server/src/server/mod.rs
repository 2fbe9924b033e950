//! The HTTP collaborator around the `snowgen` core.
//!
//! ## Structure
//!
//! - [`config`] - CLI/env configuration (`CliArgs` -> `ServerConfig`).
//! - [`error`] - HTTP error mapping.
//! - [`routes`] - axum router and handlers.
//! - [`telemetry`] - `tracing` subscriber setup.

pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

use anyhow::Context;
use config::ServerConfig;
use snowgen::{PrivateIpv4Provider, SnowflakeGenerator, StaticWorkerId, WorkerIdProvider};

/// Picks the configured worker id if present, otherwise derives one from the
/// host's private address.
pub fn worker_id_provider(config: &ServerConfig) -> Box<dyn WorkerIdProvider> {
    match config.worker_id {
        Some(id) => Box::new(StaticWorkerId(id)),
        None => Box::new(PrivateIpv4Provider::<snowgen::SystemAddresses>::default()),
    }
}

/// Resolves the worker id and builds the process-wide generator.
///
/// Every failure here is fatal for startup.
pub fn build_generator(
    config: &ServerConfig,
    provider: &dyn WorkerIdProvider,
) -> anyhow::Result<SnowflakeGenerator> {
    let worker_id = provider
        .worker_id()
        .context("failed to resolve a worker id; set WORKER_ID to override")?;

    let generator = SnowflakeGenerator::new(worker_id)
        .with_context(|| format!("worker id {worker_id} rejected"))?;

    Ok(match config.max_spin {
        Some(max_spin) => generator.with_max_spin(max_spin),
        None => generator,
    })
}
