//! HTTP client for the OpenAlex API

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{Result, SourceError};
use crate::config::OpenAlexConfig;
use crate::models::{Author, Work};

/// User agent sent with every upstream request.
const USER_AGENT: &str = concat!("ScholarGraph-Ingester/", env!("CARGO_PKG_VERSION"));

/// Cursor value that starts a paginated listing.
const FIRST_CURSOR: &str = "*";

/// Paginated OpenAlex list response.
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
    #[serde(default)]
    meta: PageMeta,
}

#[derive(Debug, Default, Deserialize)]
struct PageMeta {
    #[serde(default)]
    next_cursor: Option<String>,
}

/// Client for the OpenAlex API.
///
/// Holds no per-request state; safe to share across tasks.
pub struct OpenAlexClient {
    client: Client,
    base_url: String,
    mailto: Option<String>,
    per_page: u32,
}

impl OpenAlexClient {
    /// Create a new client from configuration.
    pub fn new(config: &OpenAlexConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(SourceError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            mailto: config.mailto.clone(),
            per_page: config.per_page,
        })
    }

    /// Fetch a single, full author entity by OpenAlex ID.
    pub async fn fetch_author(&self, author_id: &str) -> Result<Author> {
        let url = format!("{}/authors/{}", self.base_url, short_id(author_id));
        self.get_json(&url, &[]).await.map_err(|e| match e {
            SourceError::BadStatus { status, .. } if status == StatusCode::NOT_FOUND => {
                SourceError::NotFound(author_id.to_string())
            },
            other => other,
        })
    }

    /// Search authors by display name. Empty list when nothing matches.
    pub async fn search_authors_by_name(&self, name: &str) -> Result<Vec<Author>> {
        let url = format!("{}/authors", self.base_url);
        let page: ListResponse<Author> =
            self.get_json(&url, &[("search", name)]).await?;
        Ok(page.results)
    }

    /// Fetch every work authored by the given author, paging with cursors
    /// until the listing is exhausted.
    ///
    /// Any page failure fails the whole call; a partial list must never be
    /// mistaken for a complete one.
    pub async fn fetch_all_works_for_author(&self, author_id: &str) -> Result<Vec<Work>> {
        let url = format!("{}/works", self.base_url);
        let filter = format!("author.id:{}", short_id(author_id));
        let per_page = self.per_page.to_string();

        let mut works = Vec::new();
        let mut cursor = FIRST_CURSOR.to_string();

        loop {
            let page: ListResponse<Work> = self
                .get_json(
                    &url,
                    &[
                        ("filter", filter.as_str()),
                        ("per-page", per_page.as_str()),
                        ("cursor", cursor.as_str()),
                    ],
                )
                .await?;

            debug!(
                author_id = %author_id,
                page_size = page.results.len(),
                total = works.len(),
                "Fetched work-list page"
            );

            let page_empty = page.results.is_empty();
            works.extend(page.results);

            match page.meta.next_cursor {
                Some(next) if !next.is_empty() && !page_empty => cursor = next,
                _ => break,
            }
        }

        Ok(works)
    }

    /// Perform a GET request and decode the JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let mut request = self.client.get(url).query(params);
        if let Some(ref mailto) = self.mailto {
            request = request.query(&[("mailto", mailto.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(SourceError::BadStatus {
                status,
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl crate::ingest::WorkSource for OpenAlexClient {
    async fn fetch_author(&self, author_id: &str) -> Result<Author> {
        OpenAlexClient::fetch_author(self, author_id).await
    }

    async fn fetch_all_works_for_author(&self, author_id: &str) -> Result<Vec<Work>> {
        OpenAlexClient::fetch_all_works_for_author(self, author_id).await
    }

    async fn search_authors_by_name(&self, name: &str) -> Result<Vec<Author>> {
        OpenAlexClient::search_authors_by_name(self, name).await
    }
}

/// Strip the `https://openalex.org/` prefix from an entity ID so it can be
/// used in URL paths and filter expressions.
fn short_id(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}
