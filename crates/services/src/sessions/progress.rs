use super::engine::Phase;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub phase: Phase,
    /// 1-based number of the question on screen, 0 before the first one.
    pub question_number: usize,
    pub total: usize,
    pub answered: usize,
    pub time_left: u32,
    pub score: u32,
    pub streak: u32,
}

impl SessionProgress {
    /// Share of the question set already answered, in percent.
    #[must_use]
    pub fn percent_answered(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let pct = self.answered.saturating_mul(100) / self.total;
        u32::try_from(pct).unwrap_or(100)
    }
}
