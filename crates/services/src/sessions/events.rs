use quiz_core::model::AnswerRecord;

/// Notifications published by a `QuizSession`, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    CountdownStarted {
        ticks: u32,
    },
    CountdownTick {
        remaining: u32,
    },
    QuestionStarted {
        index: usize,
        time_left: u32,
    },
    TimerTick {
        index: usize,
        time_left: u32,
    },
    /// The question timer hit zero; an `Answered` event with `NoAnswer` follows.
    TimedOut {
        index: usize,
    },
    Answered {
        index: usize,
        record: AnswerRecord,
        score: u32,
        streak: u32,
    },
    Finished {
        final_score: u32,
        correct_count: u32,
        total_questions: u32,
        best_streak: u32,
    },
}
