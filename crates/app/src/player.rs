use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};

use quiz_core::model::{AnswerChoice, Question};

/// What the simulated player does with one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Answer after thinking for the given time.
    Answer { think: Duration, choice: AnswerChoice },
    /// Let the timer run out.
    Wait,
}

/// A seeded stand-in for a human player.
#[derive(Debug)]
pub struct SimulatedPlayer {
    rng: StdRng,
    accuracy: f64,
}

impl SimulatedPlayer {
    /// `accuracy` is clamped to `0.0..=1.0`; NaN counts as 0.
    #[must_use]
    pub fn new(seed: u64, accuracy: f64) -> Self {
        let accuracy = if accuracy.is_nan() {
            0.0
        } else {
            accuracy.clamp(0.0, 1.0)
        };
        Self {
            rng: StdRng::seed_from_u64(seed),
            accuracy,
        }
    }

    /// Pick a move for `question` given `budget_secs` on the clock.
    pub fn decide(&mut self, question: &Question, budget_secs: u32) -> Move {
        // a few seconds past the budget means the player never answers
        let think = self.rng.random_range(0..budget_secs + 3);
        if think >= budget_secs {
            return Move::Wait;
        }

        let correct = question.correct_index();
        let index = if self.rng.random_bool(self.accuracy) {
            correct
        } else {
            (0..question.options().len())
                .filter(|&i| i != correct)
                .choose(&mut self.rng)
                .unwrap_or(correct)
        };

        Move::Answer {
            think: Duration::from_secs(u64::from(think)),
            choice: AnswerChoice::Option(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionId;

    fn question() -> Question {
        let options = ["a", "b", "c", "d"].iter().map(ToString::to_string).collect();
        Question::new(QuestionId::new(1), "Pick", options, 2).unwrap()
    }

    #[test]
    fn same_seed_plays_the_same_moves() {
        let q = question();
        let mut a = SimulatedPlayer::new(7, 0.5);
        let mut b = SimulatedPlayer::new(7, 0.5);
        for _ in 0..20 {
            assert_eq!(a.decide(&q, 15), b.decide(&q, 15));
        }
    }

    #[test]
    fn perfect_player_only_picks_the_correct_option() {
        let q = question();
        let mut player = SimulatedPlayer::new(1, 1.0);
        for _ in 0..50 {
            match player.decide(&q, 15) {
                Move::Answer { think, choice } => {
                    assert!(think < Duration::from_secs(15));
                    assert_eq!(choice, AnswerChoice::Option(2));
                }
                Move::Wait => {}
            }
        }
    }

    #[test]
    fn hopeless_player_never_picks_the_correct_option() {
        let q = question();
        let mut player = SimulatedPlayer::new(3, 0.0);
        for _ in 0..50 {
            if let Move::Answer { choice, .. } = player.decide(&q, 15) {
                assert_ne!(choice, AnswerChoice::Option(2));
                assert!(choice.index().is_some_and(|i| q.has_option(i)));
            }
        }
    }
}
