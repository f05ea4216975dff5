use scoring::{
    Result,
    dto::ranking::{FinalizeSectionsRequest, LeaderboardResponse, RankContestRequest},
};

/// Normalize per-question raw scores and rank the participants
pub fn rank_contest(request: &RankContestRequest) -> Result<LeaderboardResponse> {
    let leaderboard = scoring::normalize_and_rank(&request.users_scores)?;

    tracing::info!(
        questions = request.users_scores.len(),
        total_users = leaderboard.len(),
        "Contest ranked"
    );

    Ok(LeaderboardResponse::from(leaderboard))
}

/// Merge section leaderboards into the final contest ranking
pub fn finalize_sections(request: &FinalizeSectionsRequest) -> Result<LeaderboardResponse> {
    let leaderboard = scoring::finalize_across_sections(&request.sections)?;

    tracing::info!(
        sections = request.sections.len(),
        total_users = leaderboard.len(),
        "Section leaderboards merged"
    );

    Ok(LeaderboardResponse::from(leaderboard))
}
