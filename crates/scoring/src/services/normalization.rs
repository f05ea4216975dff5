use std::collections::HashMap;

use tracing::debug;

use crate::dto::ranking::{ScoreSubmission, SectionEntry};
use crate::error::{EntryLocation, RankingError, Result};
use crate::models::{AccumulatedResult, QuestionBlock, ScoreEntry, Timestamp};

/// Population statistics of the raw scores of one question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestionStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl QuestionStats {
    /// Returns `None` for an empty block.
    ///
    /// Blocks whose scores are all identical get a standard deviation of
    /// exactly zero, even when the floating point mean would not be exact.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        let first = *scores.first()?;
        let count = scores.len();

        if scores.iter().all(|&score| score == first) {
            return Some(Self {
                count,
                mean: first,
                std_dev: 0.0,
            });
        }

        let n = count as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
        })
    }

    pub fn is_degenerate(&self) -> bool {
        self.std_dev == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.mean.is_finite() && self.std_dev.is_finite()
    }

    pub fn z_score(&self, raw_score: f64) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            (raw_score - self.mean) / self.std_dev
        }
    }
}

/// Validates every submission of every question before anything is computed.
pub fn validate_blocks(blocks: &[Vec<ScoreSubmission>]) -> Result<Vec<QuestionBlock>> {
    blocks
        .iter()
        .enumerate()
        .map(|(question, block)| {
            block
                .iter()
                .enumerate()
                .map(|(entry, submission)| {
                    ScoreEntry::from_submission(submission, EntryLocation::Question { question, entry })
                })
                .collect()
        })
        .collect()
}

/// Per-user running totals, in order of first appearance.
#[derive(Debug, Default)]
pub struct ScoreAccumulator {
    positions: HashMap<String, usize>,
    results: Vec<AccumulatedResult>,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.results.len()
    }

    fn entry(&mut self, user_id: &str) -> &mut AccumulatedResult {
        let position = match self.positions.get(user_id) {
            Some(&position) => position,
            None => {
                self.results.push(AccumulatedResult::new(user_id));
                self.positions.insert(user_id.to_string(), self.results.len() - 1);
                self.results.len() - 1
            }
        };
        &mut self.results[position]
    }

    /// Folds one question into the totals.
    ///
    /// Every entry counts, so a user listed twice in the same question gets
    /// both z-scores.
    pub fn add_question(&mut self, question: usize, block: &[ScoreEntry]) -> Result<()> {
        let scores: Vec<f64> = block.iter().map(|entry| entry.raw_score).collect();

        let Some(stats) = QuestionStats::from_scores(&scores) else {
            debug!(question, "Skipping question without submissions");
            return Ok(());
        };

        if !stats.is_finite() {
            return Err(RankingError::Computation(format!(
                "question {}: score statistics are not finite",
                question + 1
            )));
        }

        debug!(
            question,
            count = stats.count,
            mean = stats.mean,
            std_dev = stats.std_dev,
            "Normalizing question"
        );

        for entry in block {
            let z_score = stats.z_score(entry.raw_score);
            let result = self.entry(&entry.user_id);
            result.add_score(z_score);
            result.observe_submission(entry.submitted_at);
        }

        Ok(())
    }

    /// Merges a row of an already normalized section.
    pub fn add_normalized(&mut self, user_id: &str, score: f64, latest_submission: Timestamp) {
        let result = self.entry(user_id);
        result.add_score(score);
        result.observe_submission(latest_submission);
    }

    /// Validates and merges every row of one section.
    pub fn add_section(&mut self, section: usize, entries: &[SectionEntry]) -> Result<()> {
        for (entry, row) in entries.iter().enumerate() {
            let location = EntryLocation::Section { section, entry };

            let user_id = row.user_id.as_deref().ok_or(RankingError::MissingField {
                location,
                field: "user_id",
            })?;

            let score = row.final_normalized_score.ok_or(RankingError::MissingField {
                location,
                field: "final_normalized_score",
            })?;
            if !score.is_finite() {
                return Err(RankingError::NonFiniteScore {
                    location,
                    field: "final_normalized_score",
                });
            }

            let latest_submission = row
                .latest_submission
                .as_ref()
                .ok_or(RankingError::MissingField {
                    location,
                    field: "latest_submission",
                })?
                .resolve(location, "latest_submission")?;

            self.add_normalized(user_id, score, latest_submission);
        }

        Ok(())
    }

    pub fn into_results(self) -> Vec<AccumulatedResult> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user_id: &str, raw_score: f64, submitted_at: &str) -> ScoreEntry {
        ScoreEntry::new(user_id, raw_score, submitted_at.parse().unwrap())
    }

    #[test]
    fn test_population_statistics() {
        let stats = QuestionStats::from_scores(&[80.0, 60.0]).unwrap();
        assert_eq!(stats.mean, 70.0);
        assert_eq!(stats.std_dev, 10.0);
        assert_eq!(stats.z_score(80.0), 1.0);
        assert_eq!(stats.z_score(60.0), -1.0);
    }

    #[test]
    fn test_empty_block_has_no_stats() {
        assert!(QuestionStats::from_scores(&[]).is_none());
    }

    #[test]
    fn test_identical_scores_are_degenerate() {
        for scores in [vec![70.0], vec![70.0, 70.0], vec![0.1, 0.1, 0.1]] {
            let stats = QuestionStats::from_scores(&scores).unwrap();
            assert!(stats.is_degenerate());
            for score in &scores {
                assert_eq!(stats.z_score(*score), 0.0);
            }
        }
    }

    #[test]
    fn test_z_scores_sum_to_zero() {
        let scores = [12.0, 97.5, 33.25, 41.0, 0.0, 68.0, 68.0];
        let stats = QuestionStats::from_scores(&scores).unwrap();
        let total: f64 = scores.iter().map(|s| stats.z_score(*s)).sum();
        assert!(total.abs() < 1e-9, "sum of z-scores was {}", total);
    }

    #[test]
    fn test_accumulates_across_questions() {
        let mut acc = ScoreAccumulator::new();
        acc.add_question(
            0,
            &[
                entry("u1", 80.0, "2026-02-26T10:05:00"),
                entry("u2", 65.0, "2026-02-26T10:07:00"),
            ],
        )
        .unwrap();
        acc.add_question(
            1,
            &[
                entry("u1", 90.0, "2026-02-26T10:15:00"),
                entry("u2", 85.0, "2026-02-26T10:18:00"),
            ],
        )
        .unwrap();

        let results = acc.into_results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].user_id, "u1");
        assert_eq!(results[0].final_normalized_score, 2.0);
        assert_eq!(results[1].final_normalized_score, -2.0);
        assert_eq!(
            results[1].latest_submission.unwrap().to_iso_string(),
            "2026-02-26T10:18:00"
        );
    }

    #[test]
    fn test_degenerate_block_still_updates_submission() {
        let mut acc = ScoreAccumulator::new();
        acc.add_question(
            0,
            &[
                entry("u1", 50.0, "2026-02-26T10:05:00"),
                entry("u2", 50.0, "2026-02-26T10:09:00"),
            ],
        )
        .unwrap();

        let results = acc.into_results();
        assert_eq!(results[0].final_normalized_score, 0.0);
        assert_eq!(results[1].final_normalized_score, 0.0);
        assert_eq!(
            results[1].latest_submission.unwrap().to_iso_string(),
            "2026-02-26T10:09:00"
        );
    }

    #[test]
    fn test_duplicate_user_in_block_counts_twice() {
        let mut acc = ScoreAccumulator::new();
        acc.add_question(
            0,
            &[
                entry("u1", 100.0, "2026-02-26T10:05:00"),
                entry("u1", 100.0, "2026-02-26T10:06:00"),
                entry("u2", 40.0, "2026-02-26T10:07:00"),
            ],
        )
        .unwrap();

        let results = acc.into_results();
        assert_eq!(results.len(), 2);
        assert!((results[0].final_normalized_score - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((results[1].final_normalized_score + 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_overflowing_statistics_fail() {
        let mut acc = ScoreAccumulator::new();
        let err = acc
            .add_question(
                0,
                &[
                    entry("u1", 1e308, "2026-02-26T10:05:00"),
                    entry("u2", -1e308, "2026-02-26T10:06:00"),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, RankingError::Computation(_)));
    }

    #[test]
    fn test_validate_blocks_reports_location() {
        let blocks = vec![
            vec![ScoreSubmission::new("u1", 80.0, "2026-02-26T10:05:00")],
            vec![ScoreSubmission {
                user_id: Some("u2".to_string()),
                raw_score: None,
                submitted_at: Some("2026-02-26T10:05:00".into()),
            }],
        ];
        let err = validate_blocks(&blocks).unwrap_err();
        assert_eq!(
            err.to_string(),
            "question 2, entry 1: missing field 'raw_score'"
        );
    }

    #[test]
    fn test_add_section_rejects_missing_timestamp() {
        let mut acc = ScoreAccumulator::new();
        let row = SectionEntry {
            latest_submission: None,
            ..SectionEntry::new("u1", 1.0, "2026-02-26T10:05:00")
        };
        let err = acc.add_section(2, &[row]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "section 3, entry 1: missing field 'latest_submission'"
        );
    }
}
