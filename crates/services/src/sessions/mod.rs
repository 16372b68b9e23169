mod engine;
mod events;
mod progress;
mod runner;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use engine::{AnswerOutcome, Phase, QuizSession};
pub use events::SessionEvent;
pub use progress::SessionProgress;
pub use runner::{PlayerCommand, SessionRunner};
pub use workflow::{PlayService, RecordedResult};
