//! In-memory fakes for the ingestion pipeline tests.
//!
//! [`InMemoryGraph`] models the merge-by-identifier semantics of the real
//! store (re-saving an entity updates it in place, edges are keyed by their
//! endpoints), which is what the orchestrator's idempotence and
//! topic-sharing tests assert against. [`ScriptedSource`] plays back a fixed
//! author and work list, or injected failures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use super::WorkSource;
use crate::graph::{AuthorFreshness, GraphError, GraphStore};
use crate::models::{Author, Topic, TopicParent, Work};
use crate::openalex::{self, SourceError};

type GraphErrorFn = Box<dyn Fn() -> GraphError + Send + Sync>;
type SourceErrorFn = Box<dyn Fn() -> SourceError + Send + Sync>;

#[derive(Debug, Clone)]
struct AuthorRecord {
    fully_ingested: bool,
    last_fetched: Option<DateTime<Utc>>,
    seq: u64,
}

#[derive(Default)]
struct GraphState {
    seq: u64,
    authors: HashMap<String, AuthorRecord>,
    /// Work id to sequence number of its first save.
    works: HashMap<String, u64>,
    topics: HashSet<String>,
    subfields: HashSet<String>,
    fields: HashSet<String>,
    domains: HashSet<String>,
    /// Edges keyed by (kind, from, to); merging an existing edge is a no-op.
    edges: HashSet<(String, String, String)>,
    /// Work ids whose next save fails, consumed on first hit.
    work_failures: HashMap<String, GraphErrorFn>,
}

/// GraphStore fake with merge-by-identifier behavior.
#[derive(Default)]
pub struct InMemoryGraph {
    state: Mutex<GraphState>,
}

impl InMemoryGraph {
    /// Pre-populate an author node, as a previous ingestion run would have.
    pub fn seed_author(
        &self,
        id: &str,
        fully_ingested: bool,
        last_fetched: Option<DateTime<Utc>>,
    ) {
        let mut state = self.state.lock().unwrap();
        state.seq += 1;
        let seq = state.seq;
        state.authors.insert(
            id.to_string(),
            AuthorRecord {
                fully_ingested,
                last_fetched,
                seq,
            },
        );
    }

    /// Make the next save of this work fail with the given error.
    pub fn fail_work_once(&self, work_id: &str, err: impl Fn() -> GraphError + Send + Sync + 'static) {
        self.state
            .lock()
            .unwrap()
            .work_failures
            .insert(work_id.to_string(), Box::new(err));
    }

    pub fn author_count(&self) -> usize {
        self.state.lock().unwrap().authors.len()
    }

    pub fn work_count(&self) -> usize {
        self.state.lock().unwrap().works.len()
    }

    pub fn topic_count(&self) -> usize {
        self.state.lock().unwrap().topics.len()
    }

    /// (subfields, fields, domains) node counts for hierarchy assertions.
    pub fn hierarchy_node_counts(&self) -> (usize, usize, usize) {
        let state = self.state.lock().unwrap();
        (
            state.subfields.len(),
            state.fields.len(),
            state.domains.len(),
        )
    }

    pub fn work_topic_edge_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .edges
            .iter()
            .filter(|(kind, _, _)| kind == "IS_ABOUT_TOPIC")
            .count()
    }

    pub fn fully_ingested(&self, id: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .authors
            .get(id)
            .is_some_and(|a| a.fully_ingested)
    }

    /// (authors, works, edges) snapshot for idempotence assertions.
    pub fn counts(&self) -> (usize, usize, usize) {
        let state = self.state.lock().unwrap();
        (state.authors.len(), state.works.len(), state.edges.len())
    }

    /// True when the author node was first written before every work node.
    pub fn author_saved_before_works(&self, id: &str) -> bool {
        let state = self.state.lock().unwrap();
        let Some(author) = state.authors.get(id) else {
            return false;
        };
        state.works.values().all(|&work_seq| author.seq < work_seq)
    }

    /// Poll until the background task sets the flag. Panics after 2 seconds.
    pub async fn wait_for_fully_ingested(&self, id: &str) {
        for _ in 0..200 {
            if self.fully_ingested(id) {
                return;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
        panic!("author {id} was never marked fully ingested");
    }

    fn merge_topic(state: &mut GraphState, owner_kind: &str, owner_id: &str, topic: &Topic) {
        state.topics.insert(topic.id.clone());
        state.subfields.insert(topic.subfield.id.clone());
        state.fields.insert(topic.field.id.clone());
        state.domains.insert(topic.domain.id.clone());
        for (edge, from, to) in [
            ("IN_SUBFIELD", &topic.id, &topic.subfield.id),
            ("IN_FIELD", &topic.subfield.id, &topic.field.id),
            ("IN_DOMAIN", &topic.field.id, &topic.domain.id),
        ] {
            state
                .edges
                .insert((edge.to_string(), from.clone(), to.clone()));
        }
        state.edges.insert((
            owner_kind.to_string(),
            owner_id.to_string(),
            topic.id.clone(),
        ));
    }
}

#[async_trait]
impl GraphStore for InMemoryGraph {
    async fn save_author(&self, author: &Author) -> crate::graph::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.seq += 1;
        let seq = state.seq;
        let last_fetched = Some(Utc::now());
        // Merge: an existing node keeps its flag and first-save order.
        state
            .authors
            .entry(author.id.clone())
            .and_modify(|a| a.last_fetched = last_fetched)
            .or_insert(AuthorRecord {
                fully_ingested: false,
                last_fetched,
                seq,
            });
        for affiliation in &author.affiliations {
            state.edges.insert((
                "AFFILIATED_WITH".to_string(),
                author.id.clone(),
                affiliation.institution.id.clone(),
            ));
        }
        for topic in &author.topics {
            Self::merge_topic(&mut state, "HAS_TOPIC", &author.id, topic);
        }
        Ok(())
    }

    async fn save_work(&self, work: &Work) -> crate::graph::Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.work_failures.remove(&work.id) {
            return Err(err());
        }
        state.seq += 1;
        let seq = state.seq;
        state.works.entry(work.id.clone()).or_insert(seq);
        for authorship in &work.authorships {
            state.edges.insert((
                "AUTHORED".to_string(),
                authorship.author.id.clone(),
                work.id.clone(),
            ));
        }
        for topic in &work.topics {
            Self::merge_topic(&mut state, "IS_ABOUT_TOPIC", &work.id, topic);
        }
        Ok(())
    }

    async fn mark_fully_ingested(&self, author_id: &str) -> crate::graph::Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.authors.get_mut(author_id) {
            Some(author) => {
                author.fully_ingested = true;
                Ok(())
            },
            None => Err(GraphError::Malformed(format!(
                "no author node for {author_id}"
            ))),
        }
    }

    async fn author_freshness(
        &self,
        author_id: &str,
    ) -> crate::graph::Result<Option<AuthorFreshness>> {
        let state = self.state.lock().unwrap();
        Ok(state.authors.get(author_id).map(|a| AuthorFreshness {
            fully_ingested: a.fully_ingested,
            last_fetched: a.last_fetched,
        }))
    }
}

/// WorkSource fake playing back a fixed script.
pub struct ScriptedSource {
    author: Option<Author>,
    works: Vec<Work>,
    author_error: Option<SourceErrorFn>,
    works_error: Option<SourceErrorFn>,
}

impl ScriptedSource {
    /// A source knowing exactly one author and their works.
    pub fn with_author(id: &str, works: Vec<Work>) -> Self {
        Self {
            author: Some(Author {
                id: id.to_string(),
                display_name: format!("Author {id}"),
                works_count: works.len() as i64,
                ..Author::default()
            }),
            works,
            author_error: None,
            works_error: None,
        }
    }

    /// A source whose author fetch always fails.
    pub fn author_error(err: impl Fn() -> SourceError + Send + Sync + 'static) -> Self {
        Self {
            author: None,
            works: Vec::new(),
            author_error: Some(Box::new(err)),
            works_error: None,
        }
    }

    /// Make the work-list fetch fail while the author fetch succeeds.
    pub fn failing_works(mut self, err: impl Fn() -> SourceError + Send + Sync + 'static) -> Self {
        self.works_error = Some(Box::new(err));
        self
    }
}

#[async_trait]
impl WorkSource for ScriptedSource {
    async fn fetch_author(&self, author_id: &str) -> openalex::Result<Author> {
        if let Some(err) = &self.author_error {
            return Err(err());
        }
        match &self.author {
            Some(author) if author.id == author_id => Ok(author.clone()),
            _ => Err(SourceError::NotFound(author_id.to_string())),
        }
    }

    async fn fetch_all_works_for_author(&self, _author_id: &str) -> openalex::Result<Vec<Work>> {
        if let Some(err) = &self.works_error {
            return Err(err());
        }
        Ok(self.works.clone())
    }

    async fn search_authors_by_name(&self, name: &str) -> openalex::Result<Vec<Author>> {
        Ok(self
            .author
            .iter()
            .filter(|a| a.display_name.contains(name))
            .cloned()
            .collect())
    }
}

/// `n` bare works with ids `{prefix}1` through `{prefix}n`.
pub fn works(prefix: &str, n: usize) -> Vec<Work> {
    (1..=n)
        .map(|i| Work {
            id: format!("{prefix}{i}"),
            title: Some(format!("Work {i}")),
            ..Work::default()
        })
        .collect()
}

/// Attach one well-known topic (and its ancestry) to a work.
pub fn tag_shared_topic(mut work: Work) -> Work {
    work.topics = vec![Topic {
        id: "T10101".to_string(),
        display_name: "Graph Data Management".to_string(),
        score: 0.97,
        subfield: TopicParent {
            id: "S1710".to_string(),
            display_name: "Information Systems".to_string(),
        },
        field: TopicParent {
            id: "F17".to_string(),
            display_name: "Computer Science".to_string(),
        },
        domain: TopicParent {
            id: "D3".to_string(),
            display_name: "Physical Sciences".to_string(),
        },
        ..Topic::default()
    }];
    work
}
