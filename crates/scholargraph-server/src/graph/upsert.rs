//! Idempotent merge operations
//!
//! Every write is a MERGE keyed on the entity identifier, with ON CREATE and
//! ON MATCH setting the same fields: upstream data is the single source of
//! truth, so create and overwrite are the same operation. The topic ancestry
//! chain is merged on every reference rather than checked first; redundant
//! merge calls are the price of being safe under concurrent ingestion runs
//! that share topics or co-authored works.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use neo4rs::{query, Query};
use tracing::debug;

use super::{AuthorFreshness, GraphError, GraphStore, Neo4jStore, Result};
use crate::models::{Author, Topic, Work};

const MERGE_AUTHOR: &str = "
    MERGE (a:Author {id: $id})
    ON CREATE SET
        a.displayName = $displayName,
        a.displayNameAlternatives = $displayNameAlternatives,
        a.orcid = $orcid,
        a.worksCount = $worksCount,
        a.citedByCount = $citedByCount,
        a.hIndex = $hIndex,
        a.i10Index = $i10Index,
        a.lastFetched = $lastFetched
    ON MATCH SET
        a.displayName = $displayName,
        a.displayNameAlternatives = $displayNameAlternatives,
        a.orcid = $orcid,
        a.worksCount = $worksCount,
        a.citedByCount = $citedByCount,
        a.hIndex = $hIndex,
        a.i10Index = $i10Index,
        a.lastFetched = $lastFetched
";

const MERGE_AFFILIATION: &str = "
    MERGE (i:Institution {id: $instId}) ON CREATE SET i.displayName = $instName
    MERGE (a:Author {id: $authorId})
    MERGE (a)-[:AFFILIATED_WITH]->(i)
";

/// The two topic statements below merge the full Domain→Field→Subfield→Topic
/// chain, each level independently, so ancestors shared with other entities
/// collapse to the same nodes. Containment edges are added, never removed.
const MERGE_AUTHOR_TOPIC: &str = "
    MATCH (a:Author {id: $authorId})
    MERGE (d:Domain {id: $domainId}) ON CREATE SET d.displayName = $domainName
    MERGE (f:Field {id: $fieldId}) ON CREATE SET f.displayName = $fieldName
    MERGE (s:Subfield {id: $subfieldId}) ON CREATE SET s.displayName = $subfieldName
    MERGE (t:Topic {id: $topicId}) ON CREATE SET t.displayName = $topicName
    MERGE (t)-[:IN_SUBFIELD]->(s)
    MERGE (s)-[:IN_FIELD]->(f)
    MERGE (f)-[:IN_DOMAIN]->(d)
    MERGE (a)-[r:HAS_TOPIC]->(t)
    SET r.paperCount = $paperCount
";

const MERGE_WORK: &str = "
    MERGE (w:Work {id: $id})
    ON CREATE SET
        w.title = $title, w.doi = $doi,
        w.publicationDate = $publicationDate, w.publicationYear = $publicationYear,
        w.citedByCount = $citedByCount, w.isRetracted = $isRetracted,
        w.isOa = $isOa, w.pdfUrl = $pdfUrl
    ON MATCH SET
        w.title = $title, w.doi = $doi,
        w.publicationDate = $publicationDate, w.publicationYear = $publicationYear,
        w.citedByCount = $citedByCount, w.isRetracted = $isRetracted,
        w.isOa = $isOa, w.pdfUrl = $pdfUrl
";

/// The author side of an authorship is merged minimally: ON CREATE sets the
/// display name, nothing more, so a partial authorship record never
/// overwrites the richer profile written by a full author ingestion.
const MERGE_AUTHORSHIP: &str = "
    MERGE (a:Author {id: $authorId}) ON CREATE SET a.displayName = $authorName
    MERGE (w:Work {id: $workId})
    MERGE (a)-[r:AUTHORED]->(w)
    SET r.position = $position, r.institutionIds = $institutionIds
";

const MERGE_VENUE: &str = "
    MERGE (v:Venue {id: $venueId}) ON CREATE SET v.displayName = $venueName
    MERGE (w:Work {id: $workId})
    MERGE (w)-[:PUBLISHED_IN]->(v)
";

const MERGE_WORK_TOPIC: &str = "
    MATCH (w:Work {id: $workId})
    MERGE (d:Domain {id: $domainId}) ON CREATE SET d.displayName = $domainName
    MERGE (f:Field {id: $fieldId}) ON CREATE SET f.displayName = $fieldName
    MERGE (s:Subfield {id: $subfieldId}) ON CREATE SET s.displayName = $subfieldName
    MERGE (t:Topic {id: $topicId}) ON CREATE SET t.displayName = $topicName
    MERGE (t)-[:IN_SUBFIELD]->(s)
    MERGE (s)-[:IN_FIELD]->(f)
    MERGE (f)-[:IN_DOMAIN]->(d)
    MERGE (w)-[r:IS_ABOUT_TOPIC]->(t)
    SET r.score = $score
";

const SET_FULLY_INGESTED: &str = "
    MATCH (a:Author {id: $id})
    SET a.fullyIngested = true
";

const READ_FRESHNESS: &str = "
    MATCH (a:Author {id: $id})
    RETURN coalesce(a.fullyIngested, false) AS fullyIngested,
           a.lastFetched AS lastFetched
";

impl Neo4jStore {
    /// Bound a write future by the configured per-entity timeout.
    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.write_timeout, fut)
            .await
            .map_err(|_| GraphError::Timeout(self.write_timeout))?
    }
}

/// Attach the topic hierarchy parameters shared by author and work merges.
fn with_topic_params(q: Query, topic: &Topic) -> Query {
    q.param("topicId", topic.id.as_str())
        .param("topicName", topic.display_name.as_str())
        .param("subfieldId", topic.subfield.id.as_str())
        .param("subfieldName", topic.subfield.display_name.as_str())
        .param("fieldId", topic.field.id.as_str())
        .param("fieldName", topic.field.display_name.as_str())
        .param("domainId", topic.domain.id.as_str())
        .param("domainName", topic.domain.display_name.as_str())
}

fn parse_last_fetched(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn save_author(&self, author: &Author) -> Result<()> {
        self.bounded(async {
            let mut txn = self.graph.start_txn().await?;

            let q = query(MERGE_AUTHOR)
                .param("id", author.id.as_str())
                .param("displayName", author.display_name.as_str())
                .param("displayNameAlternatives", author.display_name_alternatives.clone())
                .param("orcid", author.orcid.clone().unwrap_or_default())
                .param("worksCount", author.works_count)
                .param("citedByCount", author.cited_by_count)
                .param("hIndex", author.summary_stats.h_index)
                .param("i10Index", author.summary_stats.i10_index)
                .param("lastFetched", Utc::now().to_rfc3339());
            txn.run(q).await?;

            for affiliation in &author.affiliations {
                if affiliation.institution.id.is_empty() {
                    continue;
                }
                let q = query(MERGE_AFFILIATION)
                    .param("instId", affiliation.institution.id.as_str())
                    .param("instName", affiliation.institution.display_name.as_str())
                    .param("authorId", author.id.as_str());
                txn.run(q).await?;
            }

            for topic in &author.topics {
                if topic.id.is_empty() {
                    continue;
                }
                let q = with_topic_params(query(MERGE_AUTHOR_TOPIC), topic)
                    .param("authorId", author.id.as_str())
                    .param("paperCount", topic.count);
                txn.run(q).await?;
            }

            txn.commit().await?;
            debug!(author_id = %author.id, topics = author.topics.len(), "Merged author");
            Ok(())
        })
        .await
    }

    async fn save_work(&self, work: &Work) -> Result<()> {
        self.bounded(async {
            let mut txn = self.graph.start_txn().await?;

            let (is_oa, pdf_url) = match work.best_oa_location {
                Some(ref loc) => (loc.is_oa, loc.pdf_url.clone().unwrap_or_default()),
                None => (false, String::new()),
            };

            let q = query(MERGE_WORK)
                .param("id", work.id.as_str())
                .param("title", work.title.clone().unwrap_or_default())
                .param("doi", work.doi.clone().unwrap_or_default())
                .param("publicationDate", work.publication_date.clone().unwrap_or_default())
                .param("publicationYear", i64::from(work.publication_year.unwrap_or(0)))
                .param("citedByCount", work.cited_by_count)
                .param("isRetracted", work.is_retracted)
                .param("isOa", is_oa)
                .param("pdfUrl", pdf_url);
            txn.run(q).await?;

            for authorship in &work.authorships {
                if authorship.author.id.is_empty() {
                    continue;
                }
                let institution_ids: Vec<String> = authorship
                    .institutions
                    .iter()
                    .map(|i| i.id.clone())
                    .collect();
                let q = query(MERGE_AUTHORSHIP)
                    .param("authorId", authorship.author.id.as_str())
                    .param("authorName", authorship.author.display_name.as_str())
                    .param("workId", work.id.as_str())
                    .param("position", authorship.author_position.as_str())
                    .param("institutionIds", institution_ids);
                txn.run(q).await?;
            }

            if let Some(source) = work.primary_location.as_ref().and_then(|l| l.source.as_ref()) {
                if !source.id.is_empty() {
                    let q = query(MERGE_VENUE)
                        .param("venueId", source.id.as_str())
                        .param("venueName", source.display_name.as_str())
                        .param("workId", work.id.as_str());
                    txn.run(q).await?;
                }
            }

            for topic in &work.topics {
                if topic.id.is_empty() {
                    continue;
                }
                let q = with_topic_params(query(MERGE_WORK_TOPIC), topic)
                    .param("workId", work.id.as_str())
                    .param("score", topic.score);
                txn.run(q).await?;
            }

            txn.commit().await?;
            debug!(work_id = %work.id, "Merged work");
            Ok(())
        })
        .await
    }

    async fn mark_fully_ingested(&self, author_id: &str) -> Result<()> {
        self.bounded(async {
            self.graph
                .run(query(SET_FULLY_INGESTED).param("id", author_id))
                .await?;
            Ok(())
        })
        .await
    }

    async fn author_freshness(&self, author_id: &str) -> Result<Option<AuthorFreshness>> {
        let mut rows = self
            .graph
            .execute(query(READ_FRESHNESS).param("id", author_id))
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };

        let fully_ingested = row.get::<bool>("fullyIngested").unwrap_or(false);
        let last_fetched = parse_last_fetched(row.get::<String>("lastFetched").ok());

        Ok(Some(AuthorFreshness {
            fully_ingested,
            last_fetched,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_last_fetched_rfc3339() {
        let parsed = parse_last_fetched(Some("2025-08-14T10:30:00+00:00".to_string()));
        assert!(parsed.is_some());
        assert_eq!(parsed.unwrap().to_rfc3339(), "2025-08-14T10:30:00+00:00");
    }

    #[test]
    fn test_parse_last_fetched_garbage_is_none() {
        assert!(parse_last_fetched(Some("yesterday".to_string())).is_none());
        assert!(parse_last_fetched(None).is_none());
    }

    #[test]
    fn test_merge_statements_set_identical_fields_on_create_and_match() {
        // Create-or-overwrite semantics require both branches to set the
        // same properties.
        for stmt in [MERGE_AUTHOR, MERGE_WORK] {
            let on_create = stmt.split("ON CREATE SET").nth(1).unwrap();
            let (create_fields, match_fields) =
                on_create.split_once("ON MATCH SET").unwrap();
            let normalize = |s: &str| {
                let mut fields: Vec<String> = s
                    .split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect();
                fields.sort();
                fields
            };
            assert_eq!(normalize(create_fields), normalize(match_fields));
        }
    }
}
