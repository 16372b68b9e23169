//! Real-time driver for a [`QuizSession`].

use std::future;

use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use quiz_core::model::{AnswerChoice, ResultSummary};

use super::engine::QuizSession;
use super::events::SessionEvent;
use crate::error::SessionError;

/// Input from the player while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Start,
    Answer(AnswerChoice),
    /// Skip the rest of the review pause.
    Acknowledge,
    Abandon,
}

/// Owns a session inside one task and feeds it wall-clock time.
///
/// The session's logical clock starts when the runner starts. Before every
/// command and after every timer sleep the session is caught up to the time
/// elapsed since then, so answers are scored against real seconds.
pub struct SessionRunner {
    session: QuizSession,
    commands: mpsc::Receiver<PlayerCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionRunner {
    #[must_use]
    pub fn new(
        session: QuizSession,
        commands: mpsc::Receiver<PlayerCommand>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            session,
            commands,
            events,
        }
    }

    /// Run until the session reaches results or the player leaves.
    ///
    /// Returns the frozen summary, or `None` if the player abandoned the
    /// session, the command channel closed, or the session failed.
    pub async fn run(mut self) -> Option<ResultSummary> {
        let epoch = Instant::now();
        info!("runner started for session {}", self.session.id());

        loop {
            self.publish();
            if self.session.is_finished() {
                return self.session.into_summary();
            }

            let deadline = self.session.next_deadline().map(|at| epoch + at);
            let timer = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => future::pending::<()>().await,
                }
            };

            tokio::select! {
                command = self.commands.recv() => {
                    if let Err(err) = self.catch_up(epoch) {
                        return self.fail(&err);
                    }
                    let result = match command {
                        Some(PlayerCommand::Start) => self.session.start(),
                        Some(PlayerCommand::Answer(choice)) => {
                            self.session.submit_answer(choice).map(|_| ())
                        }
                        Some(PlayerCommand::Acknowledge) => self.session.advance(),
                        Some(PlayerCommand::Abandon) => return self.leave(),
                        None => {
                            debug!("command channel closed for session {}", self.session.id());
                            return self.leave();
                        }
                    };
                    // rejected calls leave the session untouched
                    if let Err(err) = result {
                        if !err.is_contract_violation() {
                            return self.fail(&err);
                        }
                    }
                }
                () = timer => {
                    if let Err(err) = self.catch_up(epoch) {
                        return self.fail(&err);
                    }
                }
            }
        }
    }

    fn catch_up(&mut self, epoch: Instant) -> Result<(), SessionError> {
        let lag = epoch
            .elapsed()
            .saturating_sub(self.session.logical_now());
        self.session.advance_clock(lag)
    }

    fn publish(&mut self) {
        for event in self.session.drain_events() {
            // A closed event channel only means nobody is watching.
            let _ = self.events.send(event);
        }
    }

    fn leave(mut self) -> Option<ResultSummary> {
        self.publish();
        self.session.abandon();
        None
    }

    fn fail(self, err: &SessionError) -> Option<ResultSummary> {
        error!("session {} failed: {err}", self.session.id());
        self.leave()
    }
}
