//! OpenAlex Source Client
//!
//! Translates ingestion requests into OpenAlex API calls and decodes the
//! responses into the entity shapes in [`crate::models`]. Stateless beyond
//! the underlying connection pool; one request in, one decoded response out.
//!
//! Endpoints used:
//! - `GET /authors/{id}` for a single full author entity
//! - `GET /authors?search={name}` for author discovery
//! - `GET /works?filter=author.id:{id}` for cursor-paginated work listing

pub mod client;

pub use client::OpenAlexClient;

use thiserror::Error;

/// Result type for source client operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Error types for the upstream source
#[derive(Debug, Error)]
pub enum SourceError {
    /// The requested entity does not exist upstream.
    #[error("Not found upstream: {0}")]
    NotFound(String),

    /// Transport-level failure (connect, TLS, protocol).
    #[error("Request error: {0}")]
    Http(reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("Bad response status {status} from {url}")]
    BadStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Upstream payload did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The bounded per-call duration elapsed.
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout(
                err.url().map(|u| u.to_string()).unwrap_or_else(|| err.to_string()),
            )
        } else if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else {
            SourceError::Http(err)
        }
    }
}
