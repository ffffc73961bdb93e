use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::features::FeatureState;
use crate::models::Author;

pub fn authors_routes() -> Router<FeatureState> {
    Router::new()
        .route("/:author_id/ingest", post(trigger_ingest))
        .route("/:author_id/freshness", get(get_freshness))
        .route("/search", get(search_authors))
}

/// Trigger an ingestion run for one author.
///
/// Checks freshness first: a fully ingested, recently fetched author is not
/// re-ingested. Otherwise the initial work batch is saved before this
/// returns 202 and the remainder continues in the background.
#[tracing::instrument(skip(state))]
async fn trigger_ingest(
    State(state): State<FeatureState>,
    Path(author_id): Path<String>,
) -> AppResult<Response> {
    let should_ingest = state
        .freshness
        .should_ingest(state.store.as_ref(), &author_id)
        .await?;

    if !should_ingest {
        tracing::info!(author_id = %author_id, "Author is fresh, skipping ingestion");
        return Ok((
            StatusCode::OK,
            Json(json!({
                "message": "Author is already fully ingested and up to date"
            })),
        )
            .into_response());
    }

    let receipt = state.orchestrator.ingest_author(&author_id).await?;
    Ok((StatusCode::ACCEPTED, Json(receipt)).into_response())
}

/// Report the freshness state of an author without mutating anything.
#[tracing::instrument(skip(state))]
async fn get_freshness(
    State(state): State<FeatureState>,
    Path(author_id): Path<String>,
) -> AppResult<Response> {
    let report = state
        .freshness
        .report(state.store.as_ref(), &author_id)
        .await?;
    Ok((StatusCode::OK, Json(report)).into_response())
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthorSummary {
    id: String,
    display_name: String,
    orcid: Option<String>,
    last_known_institution: Option<String>,
    works_count: i64,
    cited_by_count: i64,
    h_index: i64,
}

impl From<Author> for AuthorSummary {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            display_name: author.display_name,
            orcid: author.orcid,
            last_known_institution: author
                .last_known_institutions
                .first()
                .map(|i| i.display_name.clone()),
            works_count: author.works_count,
            cited_by_count: author.cited_by_count,
            h_index: author.summary_stats.h_index,
        }
    }
}

/// Search the upstream source for authors by display name.
#[tracing::instrument(skip(state, params), fields(name = ?params.name))]
async fn search_authors(
    State(state): State<FeatureState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Response> {
    let name = match params.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return Err(AppError::BadRequest(
                "query parameter 'name' is required".to_string(),
            ))
        },
    };

    let authors = state.source.search_authors_by_name(&name).await?;
    let results: Vec<AuthorSummary> = authors.into_iter().map(AuthorSummary::from).collect();

    tracing::debug!(count = results.len(), "Author search completed");
    Ok((StatusCode::OK, Json(json!({ "results": results }))).into_response())
}
