//! Neo4j connection wrapper

use neo4rs::{query, Graph};
use std::time::Duration;
use tracing::info;

use super::Result;
use crate::config::GraphConfig;

/// Handle to the Neo4j graph store.
///
/// Cloning is cheap; the underlying driver holds the connection pool.
#[derive(Clone)]
pub struct Neo4jStore {
    pub(super) graph: Graph,
    pub(super) write_timeout: Duration,
}

impl Neo4jStore {
    /// Connect to Neo4j and verify the connection with a round trip.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let graph = Graph::new(&config.uri, &config.username, &config.password).await?;

        let store = Self {
            graph,
            write_timeout: Duration::from_secs(config.write_timeout_secs),
        };
        store.ping().await?;

        info!(uri = %config.uri, "Connected to Neo4j");
        Ok(store)
    }

    /// Round-trip the connection; used by `connect` and the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        let mut rows = self.graph.execute(query("RETURN 1 AS ok")).await?;
        while rows.next().await?.is_some() {}
        Ok(())
    }
}
