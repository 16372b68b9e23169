use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use quiz_core::Clock;
use quiz_core::model::{
    AnswerChoice, AnswerRecord, Question, QuizRules, ResultSummary, SessionId, Topic, UserId,
    ensure_unique_ids,
};
use quiz_core::scoring::ScoreKeeper;
use quiz_core::time::offset;
use quiz_core::timer::{Fired, TimerId, TimerQueue};

use super::events::SessionEvent;
use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// State of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Lobby,
    Countdown,
    Playing,
    Results,
}

/// Timers a session arms on its own queue. Question-scoped payloads carry the
/// index they were armed for; a payload for any other index is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTimer {
    Countdown,
    QuestionTick { index: usize },
    Advance { index: usize },
}

/// Outcome of a recorded answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub index: usize,
    pub record: AnswerRecord,
    pub score: u32,
    pub streak: u32,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One timed attempt at a topic's question set: lobby, countdown, playing, results.
///
/// The session owns both of its timers (question tick and advance-after-review)
/// on a logical [`TimerQueue`]; time only moves through [`QuizSession::advance_clock`].
/// Dropping the session drops the queue; [`QuizSession::abandon`] clears it
/// and disposes the session, so nothing can fire against a discarded session.
pub struct QuizSession {
    id: SessionId,
    topic: Topic,
    player: Option<UserId>,
    rules: QuizRules,
    clock: Clock,
    questions: Vec<Question>,
    phase: Phase,
    current: usize,
    countdown_left: u32,
    time_left: u32,
    keeper: ScoreKeeper,
    answers: Vec<AnswerRecord>,
    timers: TimerQueue<SessionTimer>,
    question_timer: Option<TimerId>,
    advance_timer: Option<TimerId>,
    events: VecDeque<SessionEvent>,
    started: Option<(DateTime<Utc>, Duration)>,
    summary: Option<ResultSummary>,
    abandoned: bool,
}

impl QuizSession {
    /// Create a session in the lobby.
    ///
    /// `player` is the caller's user context, used only to attribute the result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    /// Returns `SessionError::Question` if two questions share an id.
    pub fn new(
        topic: Topic,
        questions: Vec<Question>,
        rules: QuizRules,
        clock: Clock,
        player: Option<UserId>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        ensure_unique_ids(&questions)?;

        let time_left = rules.time_budget_secs();
        Ok(Self {
            id: SessionId::generate(),
            topic,
            player,
            rules,
            clock,
            questions,
            phase: Phase::Lobby,
            current: 0,
            countdown_left: 0,
            time_left,
            keeper: ScoreKeeper::new(),
            answers: Vec::new(),
            timers: TimerQueue::new(),
            question_timer: None,
            advance_timer: None,
            events: VecDeque::new(),
            started: None,
            summary: None,
            abandoned: false,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
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
    pub fn rules(&self) -> &QuizRules {
        &self.rules
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Cursor into the question set; equals the set's length once in `Results`.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::Playing => self.questions.get(self.current),
            _ => None,
        }
    }

    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    #[must_use]
    pub fn countdown_left(&self) -> u32 {
        self.countdown_left
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.keeper.score()
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.keeper.streak()
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.keeper.best_streak()
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// True once the question on screen has a recorded answer.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answers.len() > self.current
    }

    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Results
    }

    /// The frozen summary, available once the session reached `Results`.
    #[must_use]
    pub fn summary(&self) -> Option<&ResultSummary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub fn into_summary(self) -> Option<ResultSummary> {
        self.summary
    }

    /// Current time on the session's logical clock.
    #[must_use]
    pub fn logical_now(&self) -> Duration {
        self.timers.now()
    }

    /// Logical time at which the next armed timer fires.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let question_number = match self.phase {
            Phase::Lobby | Phase::Countdown => 0,
            Phase::Playing => self.current + 1,
            Phase::Results => self.questions.len(),
        };
        SessionProgress {
            phase: self.phase,
            question_number,
            total: self.questions.len(),
            answered: self.answers.len(),
            time_left: self.time_left,
            score: self.score(),
            streak: self.streak(),
        }
    }

    /// Take every event published since the last call.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    //
    // ─── COMMANDS ──────────────────────────────────────────────────────────────
    //

    /// Leave the lobby and start the countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside the lobby.
    /// Returns `SessionError::Abandoned` after [`QuizSession::abandon`].
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.ensure_live()?;
        if self.phase != Phase::Lobby {
            return Err(self.reject(SessionError::InvalidTransition {
                phase: self.phase,
                action: "start",
            }));
        }

        self.started = Some((self.clock.now(), self.timers.now()));
        self.phase = Phase::Countdown;
        self.countdown_left = self.rules.countdown_ticks();
        self.timers.schedule(self.rules.tick(), SessionTimer::Countdown);
        self.events.push_back(SessionEvent::CountdownStarted {
            ticks: self.countdown_left,
        });
        info!(
            "session {} started for topic {} ({} questions)",
            self.id,
            self.topic.slug(),
            self.questions.len()
        );
        Ok(())
    }

    /// Record the player's answer for the question on screen.
    ///
    /// `AnswerChoice::NoAnswer` is a skip: scored like a timeout (incorrect,
    /// streak reset) but with the time used so far rather than the full budget.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Playing`.
    /// Returns `SessionError::Abandoned` after [`QuizSession::abandon`].
    /// Returns `SessionError::AlreadyAnswered` for a second answer to the same question.
    /// Returns `SessionError::InvalidAnswer` if the index is not one of the options.
    /// In every error case the session is left unchanged.
    pub fn submit_answer(
        &mut self,
        choice: impl Into<AnswerChoice>,
    ) -> Result<AnswerOutcome, SessionError> {
        let choice = choice.into();
        self.ensure_live()?;
        if self.phase != Phase::Playing {
            return Err(self.reject(SessionError::InvalidTransition {
                phase: self.phase,
                action: "submit an answer",
            }));
        }
        if self.is_answered() {
            return Err(self.reject(SessionError::AlreadyAnswered {
                index: self.current,
            }));
        }
        if let AnswerChoice::Option(index) = choice {
            let options = self.questions[self.current].options().len();
            if index >= options {
                return Err(self.reject(SessionError::InvalidAnswer { index, options }));
            }
        }

        Ok(self.record_answer(choice))
    }

    /// Move past the review pause right away instead of waiting for the timer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Playing` or before
    /// the question on screen has been answered.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        self.ensure_live()?;
        if self.phase != Phase::Playing {
            return Err(self.reject(SessionError::InvalidTransition {
                phase: self.phase,
                action: "advance",
            }));
        }
        if !self.is_answered() {
            return Err(self.reject(SessionError::InvalidTransition {
                phase: self.phase,
                action: "advance before answering",
            }));
        }

        if let Some(id) = self.advance_timer.take() {
            self.timers.cancel(id);
        }
        self.next_question()
    }

    /// Move the logical clock forward, firing every timer that comes due.
    /// The clock saturates at `Duration::MAX`. An abandoned session ignores
    /// the call.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError::Summary` from freezing the result; a session
    /// only freezes once every question is answered, so this does not occur.
    pub fn advance_clock(&mut self, by: Duration) -> Result<(), SessionError> {
        if self.abandoned {
            return Ok(());
        }
        let until = self.timers.now().saturating_add(by);
        while let Some(fired) = self.timers.advance_to(until) {
            self.on_timer(fired)?;
        }
        Ok(())
    }

    /// Walk away from the session. Both timers are disarmed, pending events are
    /// dropped and no result is produced; later commands are rejected with
    /// `SessionError::Abandoned`.
    pub fn abandon(&mut self) {
        if self.abandoned {
            return;
        }
        self.abandoned = true;
        self.events.clear();
        self.timers.clear();
        self.question_timer = None;
        self.advance_timer = None;
        info!(
            "session {} abandoned in {:?} after {} answers",
            self.id,
            self.phase,
            self.answers.len()
        );
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    fn on_timer(&mut self, fired: Fired<SessionTimer>) -> Result<(), SessionError> {
        match fired.payload {
            SessionTimer::Countdown => {
                if self.phase != Phase::Countdown {
                    return Ok(());
                }
                self.countdown_left = self.countdown_left.saturating_sub(1);
                self.events.push_back(SessionEvent::CountdownTick {
                    remaining: self.countdown_left,
                });
                if self.countdown_left == 0 {
                    self.enter_question(0);
                } else {
                    self.timers.schedule(self.rules.tick(), SessionTimer::Countdown);
                }
            }
            SessionTimer::QuestionTick { index } => {
                if self.question_timer != Some(fired.id) || index != self.current {
                    debug!("session {}: dropping stale tick for question {index}", self.id);
                    return Ok(());
                }
                self.question_timer = None;
                self.time_left = self.time_left.saturating_sub(1);
                self.events.push_back(SessionEvent::TimerTick {
                    index,
                    time_left: self.time_left,
                });
                if self.time_left == 0 {
                    self.events.push_back(SessionEvent::TimedOut { index });
                    self.record_answer(AnswerChoice::NoAnswer);
                } else {
                    self.arm_question_tick();
                }
            }
            SessionTimer::Advance { index } => {
                if self.advance_timer != Some(fired.id) || index != self.current {
                    debug!("session {}: dropping stale advance for question {index}", self.id);
                    return Ok(());
                }
                self.advance_timer = None;
                self.next_question()?;
            }
        }
        Ok(())
    }

    fn record_answer(&mut self, choice: AnswerChoice) -> AnswerOutcome {
        if let Some(id) = self.question_timer.take() {
            self.timers.cancel(id);
        }

        let index = self.current;
        let question = &self.questions[index];
        let correct = choice.index() == Some(question.correct_index());
        let budget = self.rules.time_budget_secs();
        let time_used = budget - self.time_left.min(budget);
        let points = self.keeper.record(&self.rules, correct, time_used);
        let record = AnswerRecord::new(question.id(), choice, correct, time_used, points);
        self.answers.push(record.clone());

        debug!(
            "session {}: question {index} answered {:?} correct={correct} used={time_used}s points={points}",
            self.id, choice
        );

        let outcome = AnswerOutcome {
            index,
            record,
            score: self.keeper.score(),
            streak: self.keeper.streak(),
        };
        self.events.push_back(SessionEvent::Answered {
            index,
            record: outcome.record.clone(),
            score: outcome.score,
            streak: outcome.streak,
        });

        self.advance_timer = Some(
            self.timers
                .schedule(self.rules.review_delay(), SessionTimer::Advance { index }),
        );
        outcome
    }

    fn next_question(&mut self) -> Result<(), SessionError> {
        if self.current + 1 < self.questions.len() {
            self.enter_question(self.current + 1);
            Ok(())
        } else {
            self.finish()
        }
    }

    fn enter_question(&mut self, index: usize) {
        self.phase = Phase::Playing;
        self.current = index;
        self.time_left = self.rules.time_budget_secs();
        self.arm_question_tick();
        self.events.push_back(SessionEvent::QuestionStarted {
            index,
            time_left: self.time_left,
        });
    }

    fn arm_question_tick(&mut self) {
        let index = self.current;
        self.question_timer = Some(
            self.timers
                .schedule(self.rules.tick(), SessionTimer::QuestionTick { index }),
        );
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        self.timers.clear();
        self.question_timer = None;
        self.advance_timer = None;

        let (started_at, started_logical) =
            self.started.unwrap_or((self.clock.now(), Duration::ZERO));
        let completed_at = offset(
            started_at,
            self.timers.now().saturating_sub(started_logical),
        );
        let summary = ResultSummary::new(
            self.id,
            self.topic.clone(),
            self.player,
            self.keeper.score(),
            self.keeper.best_streak(),
            self.questions.len(),
            self.answers.clone(),
            started_at,
            completed_at,
        )?;

        self.current = self.questions.len();
        self.phase = Phase::Results;
        self.events.push_back(SessionEvent::Finished {
            final_score: summary.final_score(),
            correct_count: summary.correct_count(),
            total_questions: summary.total_questions(),
            best_streak: summary.best_streak(),
        });
        info!(
            "session {} finished: score {} ({}/{} correct, best streak {})",
            self.id,
            summary.final_score(),
            summary.correct_count(),
            summary.total_questions(),
            summary.best_streak()
        );
        self.summary = Some(summary);
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), SessionError> {
        if self.abandoned {
            return Err(self.reject(SessionError::Abandoned));
        }
        Ok(())
    }

    fn reject(&self, err: SessionError) -> SessionError {
        warn!("session {}: rejected call: {err}", self.id);
        err
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("topic", &self.topic.slug())
            .field("phase", &self.phase)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("time_left", &self.time_left)
            .field("score", &self.keeper.score())
            .field("streak", &self.keeper.streak())
            .field("answers_len", &self.answers.len())
            .field("pending_timers", &self.timers.len())
            .field("abandoned", &self.abandoned)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionId, TopicId};
    use quiz_core::scoring::replay;
    use quiz_core::time::{fixed_clock, fixed_now};

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn review() -> Duration {
        QuizRules::standard().review_delay()
    }

    fn question(id: u64, correct: usize) -> Question {
        let options = ["A", "B", "C", "D"].iter().map(ToString::to_string).collect();
        Question::new(QuestionId::new(id), format!("Q{id}"), options, correct).unwrap()
    }

    fn build_session(n: u64) -> QuizSession {
        let topic = Topic::new(TopicId::new(1), "demo", "Demo", "❓", 3).unwrap();
        let questions = (1..=n).map(|id| question(id, 0)).collect();
        QuizSession::new(
            topic,
            questions,
            QuizRules::standard(),
            fixed_clock(),
            Some(UserId::new(9)),
        )
        .unwrap()
    }

    fn playing_session(n: u64) -> QuizSession {
        let mut session = build_session(n);
        session.start().unwrap();
        session.advance_clock(secs(3)).unwrap();
        assert_eq!(session.phase(), Phase::Playing);
        session
    }

    fn assert_invariants(session: &QuizSession) {
        let len = session.questions().len();
        assert!(session.current_index() <= len);
        assert_eq!(session.current_index() == len, session.phase() == Phase::Results);
        assert!(session.best_streak() >= session.streak());
    }

    #[test]
    fn empty_question_set_is_rejected() {
        let topic = Topic::new(TopicId::new(1), "demo", "Demo", "", 0).unwrap();
        let err = QuizSession::new(topic, Vec::new(), QuizRules::standard(), fixed_clock(), None)
            .unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn duplicate_question_ids_are_rejected() {
        let topic = Topic::new(TopicId::new(1), "demo", "Demo", "", 2).unwrap();
        let err = QuizSession::new(
            topic,
            vec![question(1, 0), question(1, 1)],
            QuizRules::standard(),
            fixed_clock(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Question(_)));
    }

    #[test]
    fn countdown_takes_three_ticks() {
        let mut session = build_session(2);
        session.start().unwrap();
        assert_eq!(session.phase(), Phase::Countdown);
        assert_eq!(session.countdown_left(), 3);

        session.advance_clock(secs(2)).unwrap();
        assert_eq!(session.phase(), Phase::Countdown);
        assert_eq!(session.countdown_left(), 1);

        session.advance_clock(secs(1)).unwrap();
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.time_left(), 15);

        let events = session.drain_events();
        assert_eq!(events[0], SessionEvent::CountdownStarted { ticks: 3 });
        assert_eq!(
            events.last(),
            Some(&SessionEvent::QuestionStarted {
                index: 0,
                time_left: 15
            })
        );
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut session = build_session(1);
        session.start().unwrap();
        let err = session.start().unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                phase: Phase::Countdown,
                ..
            }
        ));
    }

    #[test]
    fn scenario_a_b_c_scores_and_finishes() {
        let mut session = playing_session(3);

        // A: instant correct answer, streak 0.
        let a = session.submit_answer(AnswerChoice::Option(0)).unwrap();
        assert_eq!(a.record.points, 1000);
        assert_eq!((session.score(), session.streak()), (1000, 1));
        assert_invariants(&session);

        session.advance_clock(review()).unwrap();
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.time_left(), 15);

        // B: correct after 10 seconds, streak 1.
        session.advance_clock(secs(10)).unwrap();
        assert_eq!(session.time_left(), 5);
        let b = session.submit_answer(AnswerChoice::Option(0)).unwrap();
        assert_eq!(b.record.time_used_secs, 10);
        assert_eq!(b.record.points, 367);
        assert_eq!((session.score(), session.streak()), (1367, 2));

        session.advance_clock(review()).unwrap();
        assert_eq!(session.current_index(), 2);

        // C: time runs out.
        session.advance_clock(secs(15)).unwrap();
        assert_eq!(session.streak(), 0);
        assert_eq!(session.best_streak(), 2);
        let c = session.answers().last().unwrap();
        assert_eq!(c.choice, AnswerChoice::NoAnswer);
        assert_eq!(c.time_used_secs, 15);
        assert!(!c.correct);
        assert_eq!(session.phase(), Phase::Playing);

        session.advance_clock(review()).unwrap();
        assert_eq!(session.phase(), Phase::Results);
        assert_invariants(&session);

        let summary = session.summary().unwrap();
        assert_eq!(summary.final_score(), 1367);
        assert_eq!(summary.correct_count(), 2);
        assert_eq!(summary.total_questions(), 3);
        assert_eq!(summary.best_streak(), 2);
        assert_eq!(summary.player(), Some(UserId::new(9)));
        assert_eq!(summary.started_at(), fixed_now());
        assert_eq!(
            (summary.completed_at() - summary.started_at()).num_milliseconds(),
            3_000 + 1_500 + 11_500 + 16_500
        );
        assert_eq!(session.pending_timers(), 0);
    }

    #[test]
    fn scenario_d_answer_in_lobby_is_rejected() {
        let mut session = build_session(3);
        let err = session.submit_answer(AnswerChoice::Option(0)).unwrap_err();
        assert!(err.is_contract_violation());
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                phase: Phase::Lobby,
                ..
            }
        ));
        assert_eq!(session.phase(), Phase::Lobby);
        assert_eq!(session.score(), 0);
        assert!(session.answers().is_empty());
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn answer_during_countdown_is_rejected() {
        let mut session = build_session(1);
        session.start().unwrap();
        assert!(session.submit_answer(AnswerChoice::Option(0)).is_err());
        assert!(session.answers().is_empty());
    }

    #[test]
    fn second_submission_is_a_no_op() {
        let mut session = playing_session(2);
        session.submit_answer(AnswerChoice::Option(0)).unwrap();
        let before = (session.score(), session.streak(), session.answers().to_vec());

        for choice in [AnswerChoice::Option(0), AnswerChoice::Option(3), AnswerChoice::NoAnswer] {
            let err = session.submit_answer(choice).unwrap_err();
            assert!(matches!(err, SessionError::AlreadyAnswered { index: 0 }));
        }
        assert_eq!(
            (session.score(), session.streak(), session.answers().to_vec()),
            before
        );
    }

    #[test]
    fn out_of_range_answer_is_not_recorded() {
        let mut session = playing_session(1);
        let err = session.submit_answer(AnswerChoice::Option(4)).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidAnswer {
                index: 4,
                options: 4
            }
        ));
        assert!(session.answers().is_empty());
        // the question is still open
        assert_eq!(session.submit_answer(AnswerChoice::Option(0)).unwrap().record.points, 1000);
    }

    #[test]
    fn answering_stops_the_question_timer() {
        let mut session = playing_session(2);
        session.advance_clock(secs(4)).unwrap();
        session.submit_answer(AnswerChoice::Option(1)).unwrap();
        assert_eq!(session.time_left(), 11);

        session.advance_clock(Duration::from_millis(1499)).unwrap();
        assert_eq!(session.time_left(), 11);
        assert_eq!(session.current_index(), 0);
        assert!(
            !session
                .drain_events()
                .iter()
                .any(|e| matches!(e, SessionEvent::TimerTick { time_left: 10, .. }))
        );
    }

    #[test]
    fn wrong_answer_resets_streak_without_points() {
        let mut session = playing_session(3);
        session.submit_answer(AnswerChoice::Option(0)).unwrap();
        session.advance_clock(review()).unwrap();
        let outcome = session.submit_answer(AnswerChoice::Option(2)).unwrap();
        assert!(!outcome.record.correct);
        assert_eq!(outcome.record.points, 0);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.best_streak(), 1);
        assert_eq!(session.score(), 1000);
    }

    #[test]
    fn explicit_no_answer_counts_time_used_so_far() {
        let mut session = playing_session(2);
        let skipped = session.submit_answer(AnswerChoice::NoAnswer).unwrap();
        assert_eq!(skipped.record.time_used_secs, 0);
        assert_eq!(skipped.record.points, 0);
        assert_eq!(session.streak(), 0);

        session.advance().unwrap();
        session.advance_clock(secs(6)).unwrap();
        let outcome = session.submit_answer(AnswerChoice::NoAnswer).unwrap();
        assert_eq!(outcome.record.time_used_secs, 6);
        assert!(!outcome.record.correct);
        assert!(outcome.record.choice.is_timeout());
    }

    #[test]
    fn advance_skips_review_delay() {
        let mut session = playing_session(2);
        assert!(matches!(
            session.advance().unwrap_err(),
            SessionError::InvalidTransition { .. }
        ));

        session.submit_answer(AnswerChoice::Option(0)).unwrap();
        session.advance().unwrap();
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.time_left(), 15);

        // the cancelled review timer must not push the cursor again
        session.advance_clock(review()).unwrap();
        assert_eq!(session.current_index(), 1);
        assert!(!session.is_answered());
    }

    #[test]
    fn advance_on_last_question_finishes() {
        let mut session = playing_session(1);
        session.submit_answer(AnswerChoice::Option(0)).unwrap();
        session.advance().unwrap();
        assert!(session.is_finished());
        assert!(session.advance().is_err());
        assert!(session.submit_answer(AnswerChoice::Option(0)).is_err());
        assert_eq!(session.pending_timers(), 0);
    }

    #[test]
    fn timeouts_only_session_reaches_results() {
        let mut session = playing_session(3);
        session.advance_clock(secs(60)).unwrap();
        assert!(session.is_finished());
        assert_eq!(session.score(), 0);
        assert_eq!(session.answers().len(), 3);
        assert!(session.answers().iter().all(|a| a.time_used_secs == 15));
        assert_invariants(&session);
    }

    #[test]
    fn invariants_hold_at_every_second() {
        let mut session = playing_session(4);
        let mut best = 0;
        for second in 0..80_u64 {
            if session.phase() == Phase::Playing && !session.is_answered() && second % 3 == 0 {
                let choice = AnswerChoice::Option(usize::from(second % 2 != 0));
                let streak_before = session.streak();
                let outcome = session.submit_answer(choice).unwrap();
                if outcome.record.correct {
                    assert_eq!(session.streak(), streak_before + 1);
                } else {
                    assert_eq!(session.streak(), 0);
                }
            }
            session.advance_clock(secs(1)).unwrap();
            assert_invariants(&session);
            assert!(session.best_streak() >= best);
            best = session.best_streak();
        }
        assert!(session.is_finished());
    }

    #[test]
    fn replaying_answers_reproduces_final_score() {
        let mut session = playing_session(5);
        for (wait, choice) in [(0, 0), (3, 0), (7, 1), (2, 0), (14, 0)] {
            session.advance_clock(secs(wait)).unwrap();
            session.submit_answer(AnswerChoice::Option(choice)).unwrap();
            session.advance().unwrap();
        }
        let summary = session.summary().unwrap();
        let totals = replay(session.rules(), summary.answers());
        assert_eq!(totals.score, summary.final_score());
        assert_eq!(totals.correct, summary.correct_count());
        assert_eq!(totals.best_streak, summary.best_streak());
    }

    #[test]
    fn abandon_mid_question_disarms_timers() {
        let mut session = playing_session(2);
        session.submit_answer(AnswerChoice::Option(0)).unwrap();
        assert!(session.pending_timers() > 0);
        let answers_before = session.answers().to_vec();

        session.abandon();
        assert!(session.is_abandoned());
        assert_eq!(session.pending_timers(), 0);
        assert!(session.drain_events().is_empty());

        // neither the review timer nor a question tick fires afterwards
        session.advance_clock(secs(60)).unwrap();
        assert!(session.drain_events().is_empty());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.phase(), Phase::Playing);
        assert!(session.summary().is_none());
        assert_eq!(session.answers(), answers_before.as_slice());

        assert!(matches!(session.advance(), Err(SessionError::Abandoned)));
        assert!(matches!(
            session.submit_answer(AnswerChoice::Option(0)),
            Err(SessionError::Abandoned)
        ));
        assert_eq!(session.score(), 1000);
    }

    #[test]
    fn abandon_in_countdown_stops_the_countdown() {
        let mut session = build_session(1);
        session.start().unwrap();
        session.abandon();
        session.abandon();
        session.advance_clock(secs(5)).unwrap();
        assert_eq!(session.phase(), Phase::Countdown);
        assert!(session.drain_events().is_empty());
        assert!(matches!(session.start(), Err(SessionError::Abandoned)));
    }

    #[test]
    fn huge_clock_steps_saturate() {
        let mut session = build_session(2);
        session.advance_clock(Duration::MAX).unwrap();
        session.advance_clock(secs(1)).unwrap();
        assert_eq!(session.logical_now(), Duration::MAX);
        assert_eq!(session.phase(), Phase::Lobby);

        let mut session = playing_session(2);
        session.advance_clock(Duration::MAX).unwrap();
        session.advance_clock(Duration::MAX).unwrap();
        assert!(session.is_finished());
        assert_eq!(session.answers().len(), 2);
        assert!(session.answers().iter().all(|a| a.choice.is_timeout()));
    }

    #[test]
    fn progress_reports_question_number() {
        let mut session = build_session(2);
        assert_eq!(session.progress().question_number, 0);
        session.start().unwrap();
        session.advance_clock(secs(3)).unwrap();
        session.submit_answer(AnswerChoice::Option(0)).unwrap();
        let progress = session.progress();
        assert_eq!(progress.question_number, 1);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.percent_answered(), 50);
    }
}
