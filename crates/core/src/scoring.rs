use serde::Serialize;

use crate::model::{AnswerRecord, QuizRules};

//
// ─── POINTS ────────────────────────────────────────────────────────────────────
//

/// Points for a correct answer.
///
/// `round(base * (1 - used / budget) * (1 + streak * rate))`, where `streak`
/// is the streak *before* this answer. The time-decay factor is clamped to
/// `[0, 1]`, so the result is never negative.
///
/// # Examples
///
/// ```
/// # use quiz_core::model::QuizRules;
/// # use quiz_core::scoring::points_for;
/// let rules = QuizRules::standard();
/// assert_eq!(points_for(&rules, 0, 0), 1000);
/// assert_eq!(points_for(&rules, 10, 1), 367);
/// ```
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn points_for(rules: &QuizRules, time_used_secs: u32, streak_before: u32) -> u32 {
    let budget = f64::from(rules.time_budget_secs());
    let used = f64::from(time_used_secs.min(rules.time_budget_secs()));
    let decay = (1.0 - used / budget).clamp(0.0, 1.0);
    let bonus = 1.0 + f64::from(streak_before) * rules.streak_bonus_rate();
    let raw = f64::from(rules.base_points()) * decay * bonus;

    raw.round().max(0.0).min(f64::from(u32::MAX)) as u32
}

//
// ─── SCORE KEEPER ──────────────────────────────────────────────────────────────
//

/// Running score, live streak and best streak of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreKeeper {
    score: u32,
    streak: u32,
    best_streak: u32,
}

impl ScoreKeeper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one answer and returns the points it earned.
    pub fn record(&mut self, rules: &QuizRules, correct: bool, time_used_secs: u32) -> u32 {
        if !correct {
            self.streak = 0;
            return 0;
        }

        let points = points_for(rules, time_used_secs, self.streak);
        self.score = self.score.saturating_add(points);
        self.streak = self.streak.saturating_add(1);
        self.best_streak = self.best_streak.max(self.streak);
        points
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }
}

//
// ─── REPLAY ────────────────────────────────────────────────────────────────────
//

/// Totals recomputed from an answer log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayTotals {
    pub score: u32,
    pub correct: u32,
    pub best_streak: u32,
}

/// Recomputes the totals of an answer log from scratch.
///
/// Only `correct` and `time_used_secs` are read; the stored `points` are
/// ignored so the result can be compared against them.
#[must_use]
pub fn replay(rules: &QuizRules, answers: &[AnswerRecord]) -> ReplayTotals {
    let mut score = 0_u32;
    let mut correct = 0_u32;
    let mut streak = 0_u32;
    let mut best_streak = 0_u32;

    for answer in answers {
        if answer.correct {
            score = score.saturating_add(points_for(rules, answer.time_used_secs, streak));
            correct = correct.saturating_add(1);
            streak += 1;
            best_streak = best_streak.max(streak);
        } else {
            streak = 0;
        }
    }

    ReplayTotals {
        score,
        correct,
        best_streak,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
