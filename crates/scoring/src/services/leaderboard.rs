use std::cmp::Ordering;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::dto::ranking::{LeaderboardRow, ScoreSubmission, SectionEntry};
use crate::error::{RankingError, Result};
use crate::models::{AccumulatedResult, QuestionBlock, Timestamp};

use super::normalization::{ScoreAccumulator, validate_blocks};

const SCORE_DECIMALS: u32 = 6;
const PERCENTILE_DECIMALS: u32 = 2;

/// Ranks contest participants from raw per-question scores.
///
/// Each question is z-score normalized on its own, the z-scores are summed per
/// user, and the totals are ranked. Empty questions are skipped. Every entry is
/// validated before any computation starts.
pub fn normalize_and_rank(users_scores: &[Vec<ScoreSubmission>]) -> Result<Vec<LeaderboardRow>> {
    let blocks = validate_blocks(users_scores)?;
    rank_question_blocks(&blocks)
}

/// Same as [`normalize_and_rank`] for entries that are already validated.
pub fn rank_question_blocks(blocks: &[QuestionBlock]) -> Result<Vec<LeaderboardRow>> {
    let mut accumulator = ScoreAccumulator::new();
    for (question, block) in blocks.iter().enumerate() {
        accumulator.add_question(question, block)?;
    }

    debug!(
        questions = blocks.len(),
        users = accumulator.len(),
        "Accumulated normalized scores"
    );

    build_leaderboard(accumulator.into_results())
}

/// Merges already normalized section leaderboards into one.
///
/// Scores are summed per user and the latest submission across sections is
/// kept; ranking then applies the same rules as [`normalize_and_rank`], so
/// among equal scores the user whose last submission came earlier wins.
pub fn finalize_across_sections(sections: &[Vec<SectionEntry>]) -> Result<Vec<LeaderboardRow>> {
    let mut accumulator = ScoreAccumulator::new();
    for (section, entries) in sections.iter().enumerate() {
        accumulator.add_section(section, entries)?;
    }

    debug!(
        sections = sections.len(),
        users = accumulator.len(),
        "Merged section scores"
    );

    build_leaderboard(accumulator.into_results())
}

#[derive(Debug)]
struct Standing {
    user_id: String,
    score: f64,
    latest_submission: Timestamp,
}

/// Higher score first, then earlier latest submission.
fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.latest_submission.cmp(&b.latest_submission))
}

fn build_leaderboard(results: Vec<AccumulatedResult>) -> Result<Vec<LeaderboardRow>> {
    let mut standings = results
        .into_iter()
        .map(|result| {
            if !result.final_normalized_score.is_finite() {
                return Err(RankingError::Computation(format!(
                    "score of user '{}' is not finite",
                    result.user_id
                )));
            }

            let latest_submission = result.latest_submission.ok_or_else(|| {
                RankingError::Computation(format!(
                    "user '{}' has no submission time",
                    result.user_id
                ))
            })?;

            // ties are detected on the rounded score
            Ok(Standing {
                score: round_dp(result.final_normalized_score, SCORE_DECIMALS),
                user_id: result.user_id,
                latest_submission,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    standings.sort_by(compare_standings);

    Ok(assign_ranks(standings))
}

/// Tied rows (same score and same latest submission) share the rank of the
/// row above; any other row is ranked by its position.
fn assign_ranks(standings: Vec<Standing>) -> Vec<LeaderboardRow> {
    let total_users = standings.len();
    let mut leaderboard: Vec<LeaderboardRow> = Vec::with_capacity(total_users);

    for (position, standing) in standings.into_iter().enumerate() {
        let rank = match leaderboard.last() {
            Some(above)
                if above.final_normalized_score == standing.score
                    && above.latest_submission == standing.latest_submission =>
            {
                above.rank
            }
            _ => position + 1,
        };

        leaderboard.push(LeaderboardRow {
            user_id: standing.user_id,
            final_normalized_score: standing.score,
            latest_submission: standing.latest_submission,
            rank,
            percentile: percentile(rank, total_users),
        });
    }

    leaderboard
}

fn percentile(rank: usize, total_users: usize) -> f64 {
    let share = (total_users - rank) as f64 / total_users as f64;
    round_dp(share * 100.0, PERCENTILE_DECIMALS)
}

/// Half-to-even rounding on the exact binary value.
///
/// Values outside the `Decimal` range have no fractional digits left and are
/// returned unchanged.
fn round_dp(value: f64, decimals: u32) -> f64 {
    let rounded = Decimal::from_f64_retain(value)
        .and_then(|d| d.round_dp(decimals).to_f64())
        .unwrap_or(value);

    // avoid "-0.0" in the output
    if rounded == 0.0 { 0.0 } else { rounded }
}
