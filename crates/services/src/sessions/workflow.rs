use std::sync::Arc;

use log::info;
use rand::seq::SliceRandom;

use quiz_core::model::{QuizRules, ResultSummary, Topic, UserId};
use storage::repository::{
    QuestionRepository, ResultId, ResultRepository, StorageError, TopicRepository,
};

use super::engine::QuizSession;
use crate::Clock;
use crate::error::SessionError;

/// A finished session after it was written to the result store.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedResult {
    pub result_id: ResultId,
    pub summary: ResultSummary,
}

/// Opens sessions from stored topics and records their results.
#[derive(Clone)]
pub struct PlayService {
    clock: Clock,
    rules: QuizRules,
    topics: Arc<dyn TopicRepository>,
    questions: Arc<dyn QuestionRepository>,
    results: Arc<dyn ResultRepository>,
    shuffle_questions: bool,
}

impl PlayService {
    #[must_use]
    pub fn new(
        clock: Clock,
        topics: Arc<dyn TopicRepository>,
        questions: Arc<dyn QuestionRepository>,
        results: Arc<dyn ResultRepository>,
    ) -> Self {
        Self {
            clock,
            rules: QuizRules::standard(),
            topics,
            questions,
            results,
            shuffle_questions: false,
        }
    }

    #[must_use]
    pub fn with_rules(mut self, rules: QuizRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_shuffle_questions(mut self, shuffle_questions: bool) -> Self {
        self.shuffle_questions = shuffle_questions;
        self
    }

    #[must_use]
    pub fn rules(&self) -> &QuizRules {
        &self.rules
    }

    /// All topics available to play.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the topic store fails.
    pub async fn list_topics(&self) -> Result<Vec<Topic>, SessionError> {
        Ok(self.topics.list_topics().await?)
    }

    /// Load a topic's question set and open a session in the lobby.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::TopicNotFound` for an unknown slug.
    /// Returns `SessionError::Empty` if the topic has no questions.
    /// Returns `SessionError::Storage` for other storage failures.
    pub async fn open_lobby(
        &self,
        slug: &str,
        player: Option<UserId>,
    ) -> Result<QuizSession, SessionError> {
        let topic = match self.topics.get_topic_by_slug(slug).await {
            Ok(topic) => topic,
            Err(StorageError::NotFound) => return Err(SessionError::TopicNotFound(slug.to_owned())),
            Err(err) => return Err(err.into()),
        };
        let mut questions = match self.questions.questions_for(topic.id()).await {
            Ok(questions) => questions,
            Err(StorageError::NotFound) => return Err(SessionError::Empty),
            Err(err) => return Err(err.into()),
        };

        if self.shuffle_questions {
            questions.shuffle(&mut rand::rng());
        }

        let session = QuizSession::new(
            topic,
            questions,
            self.rules.clone(),
            self.clock,
            player,
        )?;
        info!(
            "opened session {} for topic {}",
            session.id(),
            session.topic().slug()
        );
        Ok(session)
    }

    /// Persist the summary of a finished session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` before the session reached results.
    /// Returns `SessionError::Storage` if the result was already recorded or the store fails.
    pub async fn finish(&self, session: &QuizSession) -> Result<RecordedResult, SessionError> {
        let summary = session.summary().ok_or(SessionError::NotFinished)?;
        self.record(summary.clone()).await
    }

    /// Persist an already frozen summary.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the result was already recorded or the store fails.
    pub async fn record(&self, summary: ResultSummary) -> Result<RecordedResult, SessionError> {
        let result_id = self.results.record_result(&summary).await?;
        info!(
            "recorded result {result_id} for session {}",
            summary.session_id()
        );
        Ok(RecordedResult { result_id, summary })
    }
}
