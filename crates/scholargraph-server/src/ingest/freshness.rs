//! Freshness policy
//!
//! Pure read-decision over the graph: given an author identifier, should an
//! ingestion run be triggered? Never mutates state, never calls the source
//! client.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::graph::{self, GraphStore};

/// Outcome of a freshness check, exposed on the freshness endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessReport {
    pub exists: bool,
    pub fully_ingested: bool,
    pub last_fetched: Option<DateTime<Utc>>,
    pub stale: bool,
    pub should_ingest: bool,
}

/// Decides whether an author needs (re-)ingestion.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessPolicy {
    max_age: Duration,
}

impl FreshnessPolicy {
    /// Policy with the given retention window in days.
    pub fn new(staleness_days: u32) -> Self {
        Self {
            max_age: Duration::days(i64::from(staleness_days)),
        }
    }

    /// Ingest when the author is absent, not fully ingested, or stale.
    pub async fn should_ingest(
        &self,
        store: &dyn GraphStore,
        author_id: &str,
    ) -> graph::Result<bool> {
        Ok(self.report(store, author_id).await?.should_ingest)
    }

    /// Full freshness breakdown for an author.
    pub async fn report(
        &self,
        store: &dyn GraphStore,
        author_id: &str,
    ) -> graph::Result<FreshnessReport> {
        let Some(freshness) = store.author_freshness(author_id).await? else {
            debug!(author_id = %author_id, "Author absent from graph, should ingest");
            return Ok(FreshnessReport {
                exists: false,
                fully_ingested: false,
                last_fetched: None,
                stale: false,
                should_ingest: true,
            });
        };

        let stale = self.is_stale(freshness.last_fetched, Utc::now());
        let should_ingest = !freshness.fully_ingested || stale;

        debug!(
            author_id = %author_id,
            fully_ingested = freshness.fully_ingested,
            stale,
            should_ingest,
            "Freshness check"
        );

        Ok(FreshnessReport {
            exists: true,
            fully_ingested: freshness.fully_ingested,
            last_fetched: freshness.last_fetched,
            stale,
            should_ingest,
        })
    }

    /// An unparseable or missing timestamp counts as stale: better one
    /// redundant (idempotent) ingestion than data that never refreshes.
    fn is_stale(&self, last_fetched: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_fetched {
            Some(fetched) => now.signed_duration_since(fetched) > self.max_age,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::testkit::InMemoryGraph;
    use std::sync::Arc;

    fn policy() -> FreshnessPolicy {
        FreshnessPolicy::new(15)
    }

    #[test]
    fn test_is_stale_inside_window() {
        let now = Utc::now();
        assert!(!policy().is_stale(Some(now - Duration::days(1)), now));
        assert!(!policy().is_stale(Some(now - Duration::days(14)), now));
    }

    #[test]
    fn test_is_stale_outside_window() {
        let now = Utc::now();
        assert!(policy().is_stale(Some(now - Duration::days(20)), now));
    }

    #[test]
    fn test_missing_timestamp_is_stale() {
        assert!(policy().is_stale(None, Utc::now()));
    }

    #[tokio::test]
    async fn test_unknown_author_should_ingest() {
        let store = Arc::new(InMemoryGraph::default());
        let report = policy().report(store.as_ref(), "A404").await.unwrap();
        assert!(!report.exists);
        assert!(report.should_ingest);
    }

    #[tokio::test]
    async fn test_fresh_fully_ingested_author_is_skipped() {
        let store = Arc::new(InMemoryGraph::default());
        store.seed_author("A1", true, Some(Utc::now() - Duration::days(1)));

        let report = policy().report(store.as_ref(), "A1").await.unwrap();
        assert!(report.exists);
        assert!(!report.stale);
        assert!(!report.should_ingest);
    }

    #[tokio::test]
    async fn test_stale_author_should_reingest() {
        let store = Arc::new(InMemoryGraph::default());
        store.seed_author("A1", true, Some(Utc::now() - Duration::days(20)));

        let report = policy().report(store.as_ref(), "A1").await.unwrap();
        assert!(report.stale);
        assert!(report.should_ingest);
    }

    #[tokio::test]
    async fn test_partially_ingested_author_should_reingest() {
        let store = Arc::new(InMemoryGraph::default());
        store.seed_author("A1", false, Some(Utc::now()));

        let report = policy().report(store.as_ref(), "A1").await.unwrap();
        assert!(!report.fully_ingested);
        assert!(report.should_ingest);
    }
}
