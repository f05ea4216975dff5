use crate::dto::ranking::ScoreSubmission;
use crate::error::{EntryLocation, RankingError, Result};

use super::Timestamp;

/// One participant's validated raw result on one question.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub user_id: String,
    pub raw_score: f64,
    pub submitted_at: Timestamp,
}

/// Entries for a single question, in submission order.
pub type QuestionBlock = Vec<ScoreEntry>;

impl ScoreEntry {
    pub fn new(user_id: impl Into<String>, raw_score: f64, submitted_at: Timestamp) -> Self {
        Self {
            user_id: user_id.into(),
            raw_score,
            submitted_at,
        }
    }

    /// Checks presence and shape of every field of a wire submission.
    pub fn from_submission(submission: &ScoreSubmission, location: EntryLocation) -> Result<Self> {
        let user_id = submission
            .user_id
            .as_ref()
            .ok_or(RankingError::MissingField {
                location,
                field: "user_id",
            })?;

        let raw_score = submission.raw_score.ok_or(RankingError::MissingField {
            location,
            field: "raw_score",
        })?;
        if !raw_score.is_finite() {
            return Err(RankingError::NonFiniteScore {
                location,
                field: "raw_score",
            });
        }

        let submitted_at = submission
            .submitted_at
            .as_ref()
            .ok_or(RankingError::MissingField {
                location,
                field: "submitted_at",
            })?
            .resolve(location, "submitted_at")?;

        Ok(Self::new(user_id.clone(), raw_score, submitted_at))
    }
}
