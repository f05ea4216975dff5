use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{EntryLocation, RankingError, Result};
use crate::models::Timestamp;

/// Submission time as handed over by the caller.
///
/// JSON callers always send a string; Rust callers can pass a structured value.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmittedAt {
    Structured(Timestamp),
    Iso(String),
}

impl SubmittedAt {
    pub fn resolve(&self, location: EntryLocation, field: &'static str) -> Result<Timestamp> {
        match self {
            Self::Structured(ts) => Ok(*ts),
            Self::Iso(value) => value.parse().map_err(|_| RankingError::InvalidTimestamp {
                location,
                field,
                value: value.clone(),
            }),
        }
    }
}

impl From<Timestamp> for SubmittedAt {
    fn from(ts: Timestamp) -> Self {
        Self::Structured(ts)
    }
}

impl From<DateTime<Utc>> for SubmittedAt {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Structured(value.into())
    }
}

impl From<NaiveDateTime> for SubmittedAt {
    fn from(value: NaiveDateTime) -> Self {
        Self::Structured(value.into())
    }
}

impl From<&str> for SubmittedAt {
    fn from(value: &str) -> Self {
        Self::Iso(value.to_string())
    }
}

impl From<String> for SubmittedAt {
    fn from(value: String) -> Self {
        Self::Iso(value)
    }
}

impl Serialize for SubmittedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Structured(ts) => ts.serialize(serializer),
            Self::Iso(value) => serializer.serialize_str(value),
        }
    }
}

impl<'de> Deserialize<'de> for SubmittedAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // parsed later, once the entry location is known
        String::deserialize(deserializer).map(Self::Iso)
    }
}

/// One participant's raw result on one question, as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoreSubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "u1")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 80.0)]
    pub raw_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "2026-02-26T10:05:00")]
    pub submitted_at: Option<SubmittedAt>,
}

impl ScoreSubmission {
    pub fn new(
        user_id: impl Into<String>,
        raw_score: f64,
        submitted_at: impl Into<SubmittedAt>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            raw_score: Some(raw_score),
            submitted_at: Some(submitted_at.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RankContestRequest {
    /// One array of submissions per question, in question order
    #[validate(length(min = 1, message = "users_scores cannot be empty"))]
    pub users_scores: Vec<Vec<ScoreSubmission>>,
}

/// A row of an already normalized section leaderboard.
///
/// `rank` and `percentile` are accepted so that a section leaderboard can be
/// posted back as-is, but they are recomputed after the merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SectionEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_normalized_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "2026-02-26T10:15:00")]
    pub latest_submission: Option<SubmittedAt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
}

impl SectionEntry {
    pub fn new(
        user_id: impl Into<String>,
        final_normalized_score: f64,
        latest_submission: impl Into<SubmittedAt>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            final_normalized_score: Some(final_normalized_score),
            latest_submission: Some(latest_submission.into()),
            rank: None,
            percentile: None,
        }
    }
}

impl From<LeaderboardRow> for SectionEntry {
    fn from(row: LeaderboardRow) -> Self {
        Self {
            user_id: Some(row.user_id),
            final_normalized_score: Some(row.final_normalized_score),
            latest_submission: Some(SubmittedAt::Structured(row.latest_submission)),
            rank: Some(row.rank),
            percentile: Some(row.percentile),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FinalizeSectionsRequest {
    /// One leaderboard per section
    #[validate(length(min = 1, message = "sections cannot be empty"))]
    pub sections: Vec<Vec<SectionEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardRow {
    pub user_id: String,
    pub final_normalized_score: f64,
    #[schema(value_type = String, example = "2026-02-26T10:15:00")]
    pub latest_submission: Timestamp,
    pub rank: usize,
    pub percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    pub total_users: usize,
    pub leaderboard: Vec<LeaderboardRow>,
}

impl From<Vec<LeaderboardRow>> for LeaderboardResponse {
    fn from(leaderboard: Vec<LeaderboardRow>) -> Self {
        Self {
            total_users: leaderboard.len(),
            leaderboard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_missing_fields_deserialize_as_none() {
        let submission: ScoreSubmission =
            serde_json::from_str(r#"{"user_id": "u1", "raw_score": 12.5}"#).unwrap();
        assert_eq!(submission.user_id.as_deref(), Some("u1"));
        assert_eq!(submission.raw_score, Some(12.5));
        assert!(submission.submitted_at.is_none());
    }

    #[test]
    fn test_submitted_at_kept_as_text_until_resolved() {
        let submission: ScoreSubmission = serde_json::from_str(
            r#"{"user_id": "u1", "raw_score": 1, "submitted_at": "not a date"}"#,
        )
        .unwrap();
        assert_eq!(
            submission.submitted_at,
            Some(SubmittedAt::Iso("not a date".to_string()))
        );
    }

    #[test]
    fn test_structured_and_text_resolve_equal() {
        let location = EntryLocation::Question {
            question: 0,
            entry: 0,
        };
        let structured = SubmittedAt::from(
            NaiveDateTime::parse_from_str("2026-02-26T10:05:00", "%Y-%m-%dT%H:%M:%S").unwrap(),
        );
        let text = SubmittedAt::from("2026-02-26T10:05:00");
        assert_eq!(
            structured.resolve(location, "submitted_at").unwrap(),
            text.resolve(location, "submitted_at").unwrap()
        );
    }

    #[test]
    fn test_empty_request_fails_validation() {
        let request = RankContestRequest {
            users_scores: vec![],
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("users_scores"));

        let request = RankContestRequest {
            users_scores: vec![vec![]],
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_section_entry_ignores_rank_and_percentile() {
        let entry: SectionEntry = serde_json::from_str(
            r#"{"user_id": "u1", "final_normalized_score": 1.5,
                "latest_submission": "2026-02-26T10:15:00", "rank": 1, "percentile": 50}"#,
        )
        .unwrap();
        assert_eq!(entry.rank, Some(1));
        assert_eq!(entry.final_normalized_score, Some(1.5));
    }

    #[test]
    fn test_response_counts_users() {
        let row = LeaderboardRow {
            user_id: "u1".to_string(),
            final_normalized_score: 0.0,
            latest_submission: "2026-02-26T10:05:00".parse().unwrap(),
            rank: 1,
            percentile: 0.0,
        };
        let response = LeaderboardResponse::from(vec![row]);
        assert_eq!(response.total_users, 1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json["leaderboard"][0]["latest_submission"],
            "2026-02-26T10:05:00"
        );
    }
}
