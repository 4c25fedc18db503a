//! Error taxonomy for the analytics pipeline.
//!
//! Every variant surfaces to HTTP clients as the same generic 500 response.
//! The detail only goes to the log.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

/// Body returned for every analytics failure.
pub const GENERIC_ANALYTICS_ERROR: &str = "Failed to process analytics data";

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed export {}: {detail}", .path.display())]
    Shape { path: PathBuf, detail: String },

    #[error("processing failed: {0}")]
    Processing(String),
}

impl AnalyticsError {
    /// Short machine-readable label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyticsError::Read { .. } => "read",
            AnalyticsError::Parse { .. } => "parse",
            AnalyticsError::Shape { .. } => "shape",
            AnalyticsError::Processing(_) => "processing",
        }
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        error!(kind = self.kind(), error = %self, "Analytics request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": GENERIC_ANALYTICS_ERROR })),
        )
            .into_response()
    }
}
