//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::graph::GraphError;
use crate::ingest::IngestError;
use crate::openalex::SourceError;

/// Result type alias for request handlers
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream source error: {0}")]
    Upstream(String),

    #[error("Upstream source timeout: {0}")]
    UpstreamTimeout(String),

    #[error("Graph store error: {0}")]
    Graph(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound(id) => AppError::NotFound(format!("no upstream entity: {id}")),
            SourceError::Timeout(msg) => AppError::UpstreamTimeout(msg),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<GraphError> for AppError {
    fn from(err: GraphError) -> Self {
        AppError::Graph(err.to_string())
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Source(e) => e.into(),
            IngestError::Graph(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(ref message) => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Upstream(ref message) => {
                tracing::error!("Upstream error: {}", message);
                (StatusCode::BAD_GATEWAY, message.clone())
            },
            AppError::UpstreamTimeout(ref message) => {
                tracing::error!("Upstream timeout: {}", message);
                (StatusCode::GATEWAY_TIMEOUT, message.clone())
            },
            AppError::Graph(ref message) => {
                tracing::error!("Graph store error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, "A graph store error occurred".to_string())
            },
            AppError::BadRequest(ref message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            },
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}
