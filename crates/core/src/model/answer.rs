use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

//
// ─── ANSWER CHOICE ─────────────────────────────────────────────────────────────
//

/// What the player picked for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerChoice {
    /// Index into the question's options.
    Option(usize),
    /// Nothing was picked: the question timer ran out, or the player
    /// skipped the question before it did.
    NoAnswer,
}

impl AnswerChoice {
    #[must_use]
    pub fn index(self) -> Option<usize> {
        match self {
            AnswerChoice::Option(index) => Some(index),
            AnswerChoice::NoAnswer => None,
        }
    }

    /// True for `NoAnswer`, whether it came from the timer or a skip.
    #[must_use]
    pub fn is_timeout(self) -> bool {
        matches!(self, AnswerChoice::NoAnswer)
    }
}

impl From<usize> for AnswerChoice {
    fn from(index: usize) -> Self {
        AnswerChoice::Option(index)
    }
}

//
// ─── ANSWER RECORD ─────────────────────────────────────────────────────────────
//

/// One entry in a session's append-only answer log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub choice: AnswerChoice,
    pub correct: bool,
    pub time_used_secs: u32,
    pub points: u32,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(
        question_id: QuestionId,
        choice: AnswerChoice,
        correct: bool,
        time_used_secs: u32,
        points: u32,
    ) -> Self {
        Self {
            question_id,
            choice,
            correct,
            time_used_secs,
            points,
        }
    }
}
