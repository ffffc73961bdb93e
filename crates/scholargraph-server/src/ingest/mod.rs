//! Ingestion pipeline
//!
//! The control-flow layer that ties the source client and the upsert engine
//! together:
//!
//! - [`orchestrator::IngestOrchestrator`]: fetch author, save author, fetch
//!   works, save an initial batch synchronously, hand the remainder to a
//!   detached background task, mark the author fully ingested
//! - [`freshness::FreshnessPolicy`]: decide whether an author needs
//!   (re-)ingestion
//!
//! The pipeline is at-least-once by design: no write is ever rolled back, a
//! failed run simply leaves `fullyIngested` unset, and merge semantics make
//! the retriggered run safe and cheap.

pub mod freshness;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testkit;

pub use freshness::{FreshnessPolicy, FreshnessReport};
pub use orchestrator::{IngestOrchestrator, IngestReceipt};

use async_trait::async_trait;
use thiserror::Error;

use crate::graph::GraphError;
use crate::models::{Author, Work};
use crate::openalex::SourceError;

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error types for the ingestion pipeline
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Upstream source: {0}")]
    Source(#[from] SourceError),

    #[error("Graph write: {0}")]
    Graph(#[from] GraphError),
}

/// Read side of the upstream bibliographic source, as the orchestrator sees
/// it. Implemented by the OpenAlex client; test code substitutes scripted
/// fakes.
#[async_trait]
pub trait WorkSource: Send + Sync {
    /// Fetch a single full author profile.
    async fn fetch_author(&self, author_id: &str) -> crate::openalex::Result<Author>;

    /// Fetch the complete work list for an author. Never returns a partial
    /// list: a page failure fails the call.
    async fn fetch_all_works_for_author(
        &self,
        author_id: &str,
    ) -> crate::openalex::Result<Vec<Work>>;

    /// Search authors by display name.
    async fn search_authors_by_name(&self, name: &str) -> crate::openalex::Result<Vec<Author>>;
}
