//! HTTP surface over a single shared generator.
//!
//! - `GET /id` issues one ID and returns its decoded record.
//! - `GET /id/{id}` decodes a decimal ID without generating anything.
//! - `GET /health` answers `ok`.
//!
//! Any other method on these paths gets `405 Method Not Allowed`.
//!
//! Generation may spin on the clock while holding the generator's lock, so it
//! runs on the blocking pool. The request timeout can then answer `408` while
//! the spinning task is left to finish on its own.

use crate::server::error::{Error, Result};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use core::time::Duration;
use snowgen::{DecodedId, SnowflakeGenerator, SnowflakeId, SystemClock, TimeSource};
use std::sync::Arc;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Shared handler state: one generator for the whole process.
///
/// A generator built with a spin budget is driven through
/// [`SnowflakeGenerator::try_next_id`] so clock faults surface as errors;
/// otherwise [`SnowflakeGenerator::next_id`] is used and never fails.
pub struct AppState<T = SystemClock>
where
    T: TimeSource,
{
    generator: Arc<SnowflakeGenerator<T>>,
    hardened: bool,
}

impl<T> Clone for AppState<T>
where
    T: TimeSource,
{
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
            hardened: self.hardened,
        }
    }
}

impl<T> AppState<T>
where
    T: TimeSource,
{
    pub fn new(generator: SnowflakeGenerator<T>) -> Self {
        let hardened = generator.max_spin().is_some();
        Self {
            generator: Arc::new(generator),
            hardened,
        }
    }

    fn next_id(&self) -> Result<SnowflakeId> {
        if self.hardened {
            Ok(self.generator.try_next_id()?)
        } else {
            Ok(self.generator.next_id())
        }
    }
}

pub fn app<T>(state: AppState<T>, request_timeout: Duration) -> Router
where
    T: TimeSource + Send + Sync + 'static,
{
    Router::new()
        .route("/id", get(next_id::<T>))
        .route("/id/{id}", get(parse_id))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

#[tracing::instrument(level = "debug", skip_all)]
async fn next_id<T>(State(state): State<AppState<T>>) -> Result<Json<DecodedId>>
where
    T: TimeSource + Send + Sync + 'static,
{
    let id = tokio::task::spawn_blocking(move || state.next_id()).await??;
    Ok(Json(id.decode()))
}

async fn parse_id(Path(raw): Path<String>) -> Result<Json<DecodedId>> {
    let id = raw
        .parse::<SnowflakeId>()
        .map_err(|source| Error::InvalidId { raw, source })?;
    Ok(Json(id.decode()))
}

async fn health() -> &'static str {
    "ok"
}
