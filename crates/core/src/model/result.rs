use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::model::{AnswerChoice, AnswerRecord, SessionId, Topic, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("answered {answered} of {total} questions")]
    IncompleteAnswers { answered: usize, total: usize },
}

//
// ─── RESULT SUMMARY ────────────────────────────────────────────────────────────
//

/// Frozen outcome of a finished quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    session_id: SessionId,
    topic: Topic,
    player: Option<UserId>,
    final_score: u32,
    correct_count: u32,
    total_questions: u32,
    best_streak: u32,
    answers: Vec<AnswerRecord>,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl ResultSummary {
    /// Freezes the outcome of a session.
    ///
    /// # Errors
    ///
    /// Returns `ResultSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `ResultSummaryError::IncompleteAnswers` if not every question has an answer.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        topic: Topic,
        player: Option<UserId>,
        final_score: u32,
        best_streak: u32,
        total_questions: usize,
        answers: Vec<AnswerRecord>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ResultSummaryError> {
        if completed_at < started_at {
            return Err(ResultSummaryError::InvalidTimeRange);
        }
        if answers.len() != total_questions {
            return Err(ResultSummaryError::IncompleteAnswers {
                answered: answers.len(),
                total: total_questions,
            });
        }

        let correct_count = answers.iter().filter(|a| a.correct).count();

        Ok(Self {
            session_id,
            topic,
            player,
            final_score,
            correct_count: saturating_u32(correct_count),
            total_questions: saturating_u32(total_questions),
            best_streak,
            answers,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    #[must_use]
    pub fn player(&self) -> Option<UserId> {
        self.player
    }

    #[must_use]
    pub fn final_score(&self) -> u32 {
        self.final_score
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Presentation-ready numbers for the results screen.
    #[must_use]
    pub fn view(&self) -> ResultsView {
        ResultsView::from_summary(self)
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

//
// ─── RESULTS VIEW ──────────────────────────────────────────────────────────────
//

/// Rank tier derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Rank {
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl Rank {
    #[must_use]
    pub fn for_score(score: u32) -> Self {
        match score {
            s if s > 5000 => Rank::Diamond,
            s if s > 3000 => Rank::Platinum,
            s if s > 1000 => Rank::Gold,
            _ => Rank::Silver,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rank::Silver => "Silver",
            Rank::Gold => "Gold",
            Rank::Platinum => "Platinum",
            Rank::Diamond => "Diamond",
        };
        f.write_str(label)
    }
}

/// Accuracy rating shown next to the rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Performance {
    NeedsWork,
    Good,
    Excellent,
}

impl Performance {
    #[must_use]
    pub fn for_accuracy(accuracy_percent: u32) -> Self {
        match accuracy_percent {
            a if a > 80 => Performance::Excellent,
            a if a > 50 => Performance::Good,
            _ => Performance::NeedsWork,
        }
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Performance::NeedsWork => "Needs Work",
            Performance::Good => "Good",
            Performance::Excellent => "Excellent",
        };
        f.write_str(label)
    }
}

/// XP awarded per correct answer in the breakdown.
pub const XP_PER_CORRECT: u32 = 100;

/// One row of the per-question breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionReview {
    pub number: usize,
    pub choice: AnswerChoice,
    pub correct: bool,
    pub time_used_secs: u32,
    pub points: u32,
}

/// Values shown on the results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub topic_name: String,
    pub topic_slug: String,
    pub final_score: u32,
    pub correct_count: u32,
    pub total_questions: u32,
    pub best_streak: u32,
    pub accuracy_percent: u32,
    pub xp_earned: u32,
    /// Correct-answer line of the XP breakdown.
    pub correct_answer_xp: u32,
    pub rank: Rank,
    pub performance: Performance,
    pub questions: Vec<QuestionReview>,
}

impl ResultsView {
    #[must_use]
    pub fn from_summary(summary: &ResultSummary) -> Self {
        let questions = summary
            .answers()
            .iter()
            .enumerate()
            .map(|(i, a)| QuestionReview {
                number: i + 1,
                choice: a.choice,
                correct: a.correct,
                time_used_secs: a.time_used_secs,
                points: a.points,
            })
            .collect();

        let accuracy_percent = ratio_percent(summary.correct_count(), summary.total_questions());

        Self {
            topic_name: summary.topic().name().to_owned(),
            topic_slug: summary.topic().slug().to_owned(),
            final_score: summary.final_score(),
            correct_count: summary.correct_count(),
            total_questions: summary.total_questions(),
            best_streak: summary.best_streak(),
            accuracy_percent,
            xp_earned: rounded_div(summary.final_score(), 10),
            correct_answer_xp: summary.correct_count().saturating_mul(XP_PER_CORRECT),
            rank: Rank::for_score(summary.final_score()),
            performance: Performance::for_accuracy(accuracy_percent),
            questions,
        }
    }

    /// Text for sharing a result outside the app.
    #[must_use]
    pub fn share_text(&self) -> String {
        format!(
            "I scored {} points in {}!\nRank: {}\nAccuracy: {}%",
            self.final_score, self.topic_name, self.rank, self.accuracy_percent
        )
    }
}

/// `round(part / whole * 100)`, or 0 when `whole` is 0.
fn ratio_percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    rounded_div(part.saturating_mul(100), whole)
}

/// Integer division rounding half up.
fn rounded_div(value: u32, divisor: u32) -> u32 {
    let value = u64::from(value);
    let divisor = u64::from(divisor);
    let rounded = (value * 2 + divisor) / (divisor * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
