//! Graph store layer
//!
//! Everything that touches Neo4j lives here: the connection wrapper, the
//! merge-by-identifier upsert engine, and the freshness reads. All writes go
//! through [`GraphStore`], a seam that lets the ingestion orchestrator run
//! against an in-memory store in tests.

pub mod client;
pub mod upsert;

pub use client::Neo4jStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::models::{Author, Work};

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Error types for the graph store
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Graph store error: {0}")]
    Store(#[from] neo4rs::Error),

    #[error("Graph write timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed value in graph result: {0}")]
    Malformed(String),
}

/// Freshness-relevant state of an Author node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorFreshness {
    pub fully_ingested: bool,
    pub last_fetched: Option<DateTime<Utc>>,
}

/// Transactional write interface to the graph.
///
/// Every method that writes is idempotent: re-running it with the same input
/// merges against existing nodes and edges instead of duplicating them. Each
/// entity save is one transaction; there is no cross-entity transaction.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Merge an Author node with its affiliations and topic hierarchy.
    /// Stamps `lastFetched`; never touches `fullyIngested`.
    async fn save_author(&self, author: &Author) -> Result<()>;

    /// Merge a Work node with its authorships, venue, and topic hierarchy.
    async fn save_work(&self, work: &Work) -> Result<()>;

    /// Set the author's `fullyIngested` flag to true.
    async fn mark_fully_ingested(&self, author_id: &str) -> Result<()>;

    /// Read the freshness state of an author, `None` when the node is absent.
    async fn author_freshness(&self, author_id: &str) -> Result<Option<AuthorFreshness>>;
}
