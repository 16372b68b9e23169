use async_trait::async_trait;
use log::debug;
use quiz_core::model::{Question, QuestionError, ResultSummary, Topic, TopicId, ensure_unique_ids};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    InvalidQuestion(#[from] QuestionError),
}

/// Identifier assigned to a recorded result.
pub type ResultId = u64;

/// Topic lookup, keyed by slug the way the play route addresses topics.
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Persist or update a topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if another topic already owns the slug.
    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError>;

    /// Fetch a topic by slug.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_topic_by_slug(&self, slug: &str) -> Result<Topic, StorageError>;

    /// List topics ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError>;
}

/// Ordered question sets per topic.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Replace the question set of a topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidQuestion` if two questions share an id.
    async fn replace_questions(
        &self,
        topic_id: TopicId,
        questions: Vec<Question>,
    ) -> Result<(), StorageError>;

    /// Fetch the ordered question set of a topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the topic has no question set.
    async fn questions_for(&self, topic_id: TopicId) -> Result<Vec<Question>, StorageError>;
}

/// Receives finished session summaries (the results-display collaborator).
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Record a finished session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the session was already recorded.
    async fn record_result(&self, summary: &ResultSummary) -> Result<ResultId, StorageError>;

    /// Fetch a recorded result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_result(&self, id: ResultId) -> Result<ResultSummary, StorageError>;
}

#[derive(Default)]
struct Results {
    next_id: ResultId,
    by_id: HashMap<ResultId, ResultSummary>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    topics: Arc<Mutex<HashMap<TopicId, Topic>>>,
    questions: Arc<Mutex<HashMap<TopicId, Vec<Question>>>>,
    results: Arc<Mutex<Results>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl TopicRepository for InMemoryRepository {
    async fn upsert_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        let mut guard = self.topics.lock().map_err(poisoned)?;
        if guard
            .values()
            .any(|t| t.slug() == topic.slug() && t.id() != topic.id())
        {
            return Err(StorageError::Conflict(format!(
                "slug {} already in use",
                topic.slug()
            )));
        }
        guard.insert(topic.id(), topic.clone());
        Ok(())
    }

    async fn get_topic_by_slug(&self, slug: &str) -> Result<Topic, StorageError> {
        let guard = self.topics.lock().map_err(poisoned)?;
        guard
            .values()
            .find(|t| t.slug() == slug)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        let guard = self.topics.lock().map_err(poisoned)?;
        let mut topics: Vec<Topic> = guard.values().cloned().collect();
        topics.sort_by_key(Topic::id);
        Ok(topics)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn replace_questions(
        &self,
        topic_id: TopicId,
        questions: Vec<Question>,
    ) -> Result<(), StorageError> {
        ensure_unique_ids(&questions)?;
        let mut guard = self.questions.lock().map_err(poisoned)?;
        guard.insert(topic_id, questions);
        Ok(())
    }

    async fn questions_for(&self, topic_id: TopicId) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        guard.get(&topic_id).cloned().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn record_result(&self, summary: &ResultSummary) -> Result<ResultId, StorageError> {
        let mut guard = self.results.lock().map_err(poisoned)?;
        if guard
            .by_id
            .values()
            .any(|r| r.session_id() == summary.session_id())
        {
            return Err(StorageError::Conflict(format!(
                "session {} already recorded",
                summary.session_id()
            )));
        }
        guard.next_id += 1;
        let id = guard.next_id;
        guard.by_id.insert(id, summary.clone());
        debug!(
            "recorded result {id} for session {} (score {})",
            summary.session_id(),
            summary.final_score()
        );
        Ok(id)
    }

    async fn get_result(&self, id: ResultId) -> Result<ResultSummary, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        guard.by_id.get(&id).cloned().ok_or(StorageError::NotFound)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub topics: Arc<dyn TopicRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub results: Arc<dyn ResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    #[must_use]
    pub fn from_repository(repo: InMemoryRepository) -> Self {
        let topics: Arc<dyn TopicRepository> = Arc::new(repo.clone());
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let results: Arc<dyn ResultRepository> = Arc::new(repo);
        Self {
            topics,
            questions,
            results,
        }
    }
}
