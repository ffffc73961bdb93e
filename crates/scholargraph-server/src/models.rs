//! Domain models for OpenAlex entities
//!
//! These structs mirror the OpenAlex JSON shapes this pipeline consumes.
//! OpenAlex omits or nulls many fields depending on entity "hydration", so
//! everything beyond the identifier is optional or defaulted.

use serde::{Deserialize, Serialize};

// ============================================================================
// Core Entities
// ============================================================================

/// A full author profile from `/authors/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub display_name_alternatives: Vec<String>,
    #[serde(default)]
    pub orcid: Option<String>,
    #[serde(default)]
    pub works_count: i64,
    #[serde(default)]
    pub cited_by_count: i64,
    #[serde(default)]
    pub summary_stats: AuthorStats,
    #[serde(default)]
    pub last_known_institutions: Vec<DehydratedInstitution>,
    #[serde(default)]
    pub affiliations: Vec<Affiliation>,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// A work (publication) from `/works`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Work {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub cited_by_count: i64,
    #[serde(default)]
    pub is_retracted: bool,
    #[serde(default)]
    pub authorships: Vec<Authorship>,
    #[serde(default)]
    pub primary_location: Option<Location>,
    #[serde(default)]
    pub best_oa_location: Option<Location>,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

// ============================================================================
// Topic Hierarchy
// ============================================================================

/// One level of the classification hierarchy above a topic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicParent {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
}

/// A topic with its full subfield/field/domain ancestry and weight.
///
/// `count` is the author-scoped publication count; `score` is the
/// work-scoped relevance. Each appears only on the entity it belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub subfield: TopicParent,
    #[serde(default)]
    pub field: TopicParent,
    #[serde(default)]
    pub domain: TopicParent,
}

// ============================================================================
// Dehydrated (Summary) Entities
// ============================================================================

/// Summary view of an institution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DehydratedInstitution {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// Summary view of an author, as embedded in authorships.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DehydratedAuthor {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub orcid: Option<String>,
}

// ============================================================================
// Nested Relationship and Helper Structs
// ============================================================================

/// Key author impact metrics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AuthorStats {
    #[serde(default)]
    pub h_index: i64,
    #[serde(default)]
    pub i10_index: i64,
}

/// Relationship between an author and an institution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Affiliation {
    pub institution: DehydratedInstitution,
    #[serde(default)]
    pub years: Vec<i32>,
}

/// Connection between an Author and a Work, with position and institutions
/// at time of authorship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authorship {
    #[serde(default)]
    pub author_position: String,
    pub author: DehydratedAuthor,
    #[serde(default)]
    pub institutions: Vec<DehydratedInstitution>,
}

/// A host or repository where a work is located.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub is_oa: bool,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub source: Option<Source>,
}

/// The venue (journal, repository) backing a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_decodes_with_minimal_fields() {
        let author: Author =
            serde_json::from_str(r#"{"id": "https://openalex.org/A1"}"#).unwrap();
        assert_eq!(author.id, "https://openalex.org/A1");
        assert!(author.affiliations.is_empty());
        assert!(author.topics.is_empty());
        assert_eq!(author.works_count, 0);
    }

    #[test]
    fn test_author_ignores_unmapped_upstream_fields() {
        // The upstream payload carries more than we persist; the
        // cross-reference id map in particular must not break decoding.
        let author: Author = serde_json::from_str(
            r#"{
                "id": "https://openalex.org/A1",
                "ids": {"openalex": "https://openalex.org/A1", "scopus": "7004212771"},
                "relevance_score": 123.4
            }"#,
        )
        .unwrap();
        assert_eq!(author.id, "https://openalex.org/A1");
    }

    #[test]
    fn test_work_tolerates_null_optionals() {
        let work: Work = serde_json::from_str(
            r#"{
                "id": "https://openalex.org/W1",
                "title": null,
                "primary_location": null,
                "best_oa_location": null,
                "topics": []
            }"#,
        )
        .unwrap();
        assert!(work.title.is_none());
        assert!(work.primary_location.is_none());
        assert!(!work.is_retracted);
    }

    #[test]
    fn test_topic_hierarchy_decodes() {
        let topic: Topic = serde_json::from_str(
            r#"{
                "id": "https://openalex.org/T1",
                "display_name": "Graph Databases",
                "score": 0.92,
                "subfield": {"id": "https://openalex.org/S1", "display_name": "Information Systems"},
                "field": {"id": "https://openalex.org/F1", "display_name": "Computer Science"},
                "domain": {"id": "https://openalex.org/D1", "display_name": "Physical Sciences"}
            }"#,
        )
        .unwrap();
        assert_eq!(topic.subfield.display_name, "Information Systems");
        assert_eq!(topic.domain.id, "https://openalex.org/D1");
        assert!(topic.score > 0.9);
    }
}
