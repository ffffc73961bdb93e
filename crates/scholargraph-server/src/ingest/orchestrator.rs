//! Ingestion orchestrator
//!
//! Top-level workflow for "ingest this author": fetch the profile, save it,
//! fetch the full work list, write the first N works before responding, and
//! hand the rest to a background task that outlives the request. The
//! author's `fullyIngested` flag is set only after every work item has been
//! accounted for, so an interrupted run is simply re-triggered by the
//! freshness policy.

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{Result, WorkSource};
use crate::config::IngestSettings;
use crate::graph::GraphStore;
use crate::models::Work;

/// Receipt returned to the caller once the initial batch is saved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReceipt {
    /// Works known upstream for this author at request time.
    pub total_works: usize,
    /// Works actually saved synchronously before this response.
    pub initial_batch_size: usize,
    pub message: String,
}

/// Orchestrates one author ingestion run.
pub struct IngestOrchestrator {
    source: Arc<dyn WorkSource>,
    store: Arc<dyn GraphStore>,
    settings: IngestSettings,
}

impl IngestOrchestrator {
    pub fn new(
        source: Arc<dyn WorkSource>,
        store: Arc<dyn GraphStore>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            source,
            store,
            settings,
        }
    }

    /// Run the ingestion workflow for one author.
    ///
    /// Returns after the initial batch is written; the remainder continues
    /// in a detached task. Errors are returned only for the author fetch and
    /// author save; everything later degrades instead of failing the
    /// request.
    pub async fn ingest_author(&self, author_id: &str) -> Result<IngestReceipt> {
        // Author fetch and save abort the run on failure: no partial state.
        let author = self.source.fetch_author(author_id).await?;
        self.store.save_author(&author).await?;
        info!(author_id = %author.id, display_name = %author.display_name, "Saved author");

        // Work-list failure degrades to zero works; fullyIngested stays
        // unset so the freshness policy re-triggers a full run later.
        let mut works = match self.source.fetch_all_works_for_author(author_id).await {
            Ok(works) => works,
            Err(e) => {
                warn!(author_id = %author_id, error = %e, "Work-list fetch failed, author saved without works");
                return Ok(IngestReceipt {
                    total_works: 0,
                    initial_batch_size: 0,
                    message: "Author saved; fetching works failed and will be retried on the next ingestion".to_string(),
                });
            },
        };

        let total_works = works.len();
        let split = total_works.min(self.settings.initial_batch_size);
        let remainder = works.split_off(split);

        let saved = save_work_batch(self.store.as_ref(), &works, "initial").await;
        info!(
            author_id = %author_id,
            saved,
            batch = works.len(),
            remaining = remainder.len(),
            "Initial batch saved"
        );

        if remainder.is_empty() {
            // Zero works, or the whole list fit in the initial batch: the
            // run is complete here and the flag must still be set.
            mark_complete(self.store.as_ref(), author_id).await;
        } else {
            self.spawn_remainder_task(author_id.to_string(), remainder, total_works);
        }

        Ok(IngestReceipt {
            total_works,
            initial_batch_size: saved,
            message: "Request accepted. Initial works are saved; the rest are ingested in the background.".to_string(),
        })
    }

    /// Detached background completion: owns its data, runs on its own
    /// lifetime. Cancelling the triggering request must not cancel this.
    fn spawn_remainder_task(&self, author_id: String, remainder: Vec<Work>, total_works: usize) {
        let store = Arc::clone(&self.store);
        info!(
            author_id = %author_id,
            remaining = remainder.len(),
            "Launching background task for remainder batch"
        );

        tokio::spawn(async move {
            let saved = save_work_batch(store.as_ref(), &remainder, "background").await;
            info!(
                author_id = %author_id,
                saved,
                remaining = remainder.len(),
                total_works,
                "Background task finished, all works processed"
            );
            mark_complete(store.as_ref(), &author_id).await;
        });
    }
}

/// Save a batch one entity-transaction at a time. Per-item failures are
/// logged and skipped; they never abort the batch.
async fn save_work_batch(store: &dyn GraphStore, works: &[Work], phase: &str) -> usize {
    let mut saved = 0;
    for work in works {
        match store.save_work(work).await {
            Ok(()) => saved += 1,
            Err(e) => {
                warn!(work_id = %work.id, phase, error = %e, "Could not save work, skipping");
            },
        }
    }
    saved
}

/// Set `fullyIngested`; on failure the flag stays unset and the freshness
/// policy re-triggers the (idempotent) run, so log and move on.
async fn mark_complete(store: &dyn GraphStore, author_id: &str) {
    match store.mark_fully_ingested(author_id).await {
        Ok(()) => info!(author_id = %author_id, "Author marked fully ingested"),
        Err(e) => {
            error!(author_id = %author_id, error = %e, "Failed to mark author fully ingested");
        },
    }
}
