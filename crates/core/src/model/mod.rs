mod answer;
mod ids;
mod question;
mod result;
mod rules;
mod topic;

pub use ids::{ParseIdError, QuestionId, SessionId, TopicId, UserId};

pub use answer::{AnswerChoice, AnswerRecord};
pub use question::{OPTION_COUNT, Question, QuestionError, ensure_unique_ids};
pub use result::{
    Performance, QuestionReview, Rank, ResultSummary, ResultSummaryError, ResultsView,
    XP_PER_CORRECT,
};
pub use rules::{QuizRules, RulesError};
pub use topic::{Topic, TopicError};
