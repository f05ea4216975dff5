use super::Timestamp;

/// Per-user running state while blocks are being folded in.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedResult {
    pub user_id: String,
    pub final_normalized_score: f64,
    pub latest_submission: Option<Timestamp>,
}

impl AccumulatedResult {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            final_normalized_score: 0.0,
            latest_submission: None,
        }
    }

    pub fn add_score(&mut self, score: f64) {
        self.final_normalized_score += score;
    }

    /// Keeps the most recent submission seen so far.
    pub fn observe_submission(&mut self, submitted_at: Timestamp) {
        match self.latest_submission {
            Some(previous) if previous >= submitted_at => {}
            _ => self.latest_submission = Some(submitted_at),
        }
    }
}
