//! ScholarGraph Server Library
//!
//! HTTP server that ingests bibliographic records from OpenAlex and
//! materializes them as a connected graph in Neo4j.
//!
//! # Overview
//!
//! - **Source Client** (`openalex`): fetches author profiles and paginated
//!   work lists from the OpenAlex API
//! - **Upsert Engine** (`graph`): idempotent merge-by-identifier writes for
//!   authors, works, institutions, venues, and the topic hierarchy
//! - **Ingestion Orchestrator** (`ingest`): splits a work list into a
//!   synchronous initial batch and a detached background remainder, and
//!   tracks completion via the author's `fullyIngested` flag
//! - **Freshness Policy** (`ingest::freshness`): decides whether an author
//!   needs (re-)ingestion
//!
//! # Framework Stack
//!
//! - **Axum**: web framework for the trigger/search/freshness endpoints
//! - **neo4rs**: Bolt driver for the Neo4j graph store
//! - **reqwest**: upstream HTTP client

pub mod config;
pub mod error;
pub mod features;
pub mod graph;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod openalex;

// Re-export commonly used types
pub use error::{AppError, AppResult};
