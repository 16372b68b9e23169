use thiserror::Error;

use crate::model::{QuestionError, ResultSummaryError, RulesError, TopicError};

/// Any validation failure raised by the domain model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Summary(#[from] ResultSummaryError),
}
