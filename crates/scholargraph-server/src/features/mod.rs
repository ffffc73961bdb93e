//! Feature modules implementing the ScholarGraph API
//!
//! Each feature is a vertical slice owning its routes and DTOs. There is one
//! slice today:
//!
//! - **authors**: trigger ingestion runs, read freshness, search upstream

pub mod authors;

use axum::Router;
use std::sync::Arc;

use crate::graph::GraphStore;
use crate::ingest::{FreshnessPolicy, IngestOrchestrator, WorkSource};

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub orchestrator: Arc<IngestOrchestrator>,
    pub store: Arc<dyn GraphStore>,
    pub source: Arc<dyn WorkSource>,
    pub freshness: FreshnessPolicy,
}

/// Creates the main API router with all feature routes mounted
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest("/authors", authors::authors_routes().with_state(state))
}
