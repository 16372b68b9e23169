use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum RulesError {
    #[error("time budget must be > 0 seconds")]
    InvalidTimeBudget,

    #[error("base points must be > 0")]
    InvalidBasePoints,

    #[error("streak bonus rate must be finite and >= 0, got {0}")]
    InvalidStreakBonusRate(f64),

    #[error("countdown must have at least one tick")]
    InvalidCountdownTicks,

    #[error("review delay must be below 60 seconds")]
    InvalidReviewDelay,
}

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// Timing and scoring knobs for a quiz session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizRules {
    time_budget_secs: u32,
    base_points: u32,
    streak_bonus_rate: f64,
    countdown_ticks: u32,
    #[serde(serialize_with = "millis::serialize")]
    review_delay: Duration,
}

impl QuizRules {
    /// The rules every topic is played with: 15 s per question, 1000 base
    /// points, +10% per streak step, a 3-tick countdown and a 1.5 s review pause.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            time_budget_secs: 15,
            base_points: 1000,
            streak_bonus_rate: 0.1,
            countdown_ticks: 3,
            review_delay: Duration::from_millis(1500),
        }
    }

    /// Creates custom rules.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` if any knob is zero or out of range.
    pub fn new(
        time_budget_secs: u32,
        base_points: u32,
        streak_bonus_rate: f64,
        countdown_ticks: u32,
        review_delay: Duration,
    ) -> Result<Self, RulesError> {
        if time_budget_secs == 0 {
            return Err(RulesError::InvalidTimeBudget);
        }
        if base_points == 0 {
            return Err(RulesError::InvalidBasePoints);
        }
        if !streak_bonus_rate.is_finite() || streak_bonus_rate < 0.0 {
            return Err(RulesError::InvalidStreakBonusRate(streak_bonus_rate));
        }
        if countdown_ticks == 0 {
            return Err(RulesError::InvalidCountdownTicks);
        }
        if review_delay >= Duration::from_secs(60) {
            return Err(RulesError::InvalidReviewDelay);
        }

        Ok(Self {
            time_budget_secs,
            base_points,
            streak_bonus_rate,
            countdown_ticks,
            review_delay,
        })
    }

    #[must_use]
    pub fn time_budget_secs(&self) -> u32 {
        self.time_budget_secs
    }

    #[must_use]
    pub fn base_points(&self) -> u32 {
        self.base_points
    }

    #[must_use]
    pub fn streak_bonus_rate(&self) -> f64 {
        self.streak_bonus_rate
    }

    #[must_use]
    pub fn countdown_ticks(&self) -> u32 {
        self.countdown_ticks
    }

    #[must_use]
    pub fn review_delay(&self) -> Duration {
        self.review_delay
    }

    /// Resolution of both the countdown and the question timer.
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_secs(1)
    }
}

impl Default for QuizRules {
    fn default() -> Self {
        Self::standard()
    }
}

mod millis {
    use std::time::Duration;

    use serde::Serializer;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rules_match_constants() {
        let rules = QuizRules::standard();
        assert_eq!(rules.time_budget_secs(), 15);
        assert_eq!(rules.base_points(), 1000);
        assert!((rules.streak_bonus_rate() - 0.1).abs() < f64::EPSILON);
        assert_eq!(rules.countdown_ticks(), 3);
        assert_eq!(rules.review_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn rejects_invalid_knobs() {
        let delay = Duration::from_millis(1500);
        assert_eq!(
            QuizRules::new(0, 1000, 0.1, 3, delay).unwrap_err(),
            RulesError::InvalidTimeBudget
        );
        assert_eq!(
            QuizRules::new(15, 0, 0.1, 3, delay).unwrap_err(),
            RulesError::InvalidBasePoints
        );
        assert!(matches!(
            QuizRules::new(15, 1000, f64::NAN, 3, delay).unwrap_err(),
            RulesError::InvalidStreakBonusRate(_)
        ));
        assert_eq!(
            QuizRules::new(15, 1000, 0.1, 0, delay).unwrap_err(),
            RulesError::InvalidCountdownTicks
        );
        assert_eq!(
            QuizRules::new(15, 1000, 0.1, 3, Duration::from_secs(60)).unwrap_err(),
            RulesError::InvalidReviewDelay
        );
    }

    #[test]
    fn serializes_delay_as_millis() {
        let json = serde_json::to_value(QuizRules::standard()).unwrap();
        assert_eq!(json["review_delay"], 1500);
    }
}
