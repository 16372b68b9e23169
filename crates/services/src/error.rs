//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionError, ResultSummaryError};
use storage::StorageError;

use crate::sessions::Phase;

/// Errors emitted by quiz sessions and the play workflow.
///
/// The first four variants are caller-contract violations: the session
/// rejects the call and leaves its state untouched, so UI callers can drop
/// them (for example a double click on an answer).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot {action} while the session is in {phase:?}")]
    InvalidTransition { phase: Phase, action: &'static str },
    #[error("answer index {index} is out of range for {options} options")]
    InvalidAnswer { index: usize, options: usize },
    #[error("question {index} was already answered")]
    AlreadyAnswered { index: usize },
    #[error("session was abandoned")]
    Abandoned,
    #[error("no questions available for session")]
    Empty,
    #[error("topic not found: {0}")]
    TopicNotFound(String),
    #[error("session has not reached results yet")]
    NotFinished,
    #[error(transparent)]
    Question(#[from] QuestionError),
    /// The result summary failed validation. The engine only freezes a summary
    /// once every question has an answer, so a session never returns this.
    #[error(transparent)]
    Summary(#[from] ResultSummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// True for rejected calls that left the session unchanged.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidTransition { .. }
                | SessionError::InvalidAnswer { .. }
                | SessionError::AlreadyAnswered { .. }
                | SessionError::Abandoned
        )
    }
}
