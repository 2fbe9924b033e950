//! Error types for the HTTP layer.
//!
//! [`Error`] implements [`IntoResponse`], mapping each case to a status code
//! and a `{"error": "..."}` body:
//!
//! - `Generation`: the hardened generator refused to issue an ID (clock behind
//!   or spin budget exhausted). `503 Service Unavailable`.
//! - `InvalidId`: a path segment was not a decimal 64-bit ID. `400 Bad
//!   Request`.
//! - `Join`: the blocking generation task panicked or was cancelled. `500
//!   Internal Server Error`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core::num::ParseIntError;
use serde_json::json;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ID generation unavailable: {0}")]
    Generation(#[from] snowgen::Error),

    #[error("invalid id `{raw}`: {source}")]
    InvalidId {
        raw: String,
        #[source]
        source: ParseIntError,
    },

    #[error("ID generation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Generation(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidId { .. } => StatusCode::BAD_REQUEST,
            Self::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "rejected request");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
