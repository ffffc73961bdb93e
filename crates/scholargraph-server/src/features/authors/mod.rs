//! Author ingestion feature
//!
//! Routes for triggering ingestion runs, inspecting freshness, and searching
//! the upstream source by name.

pub mod routes;

pub use routes::authors_routes;
