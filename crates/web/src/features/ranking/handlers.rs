use axum::{
    Json,
    response::{IntoResponse, Response},
};
use scoring::dto::ranking::{FinalizeSectionsRequest, LeaderboardResponse, RankContestRequest};
use validator::Validate;

use crate::error::WebResult;

use super::services;

#[utoipa::path(
    post,
    path = "/api/ranking/contest",
    request_body = RankContestRequest,
    responses(
        (status = 200, description = "Contest leaderboard computed from raw per-question scores", body = LeaderboardResponse),
        (status = 400, description = "Empty users_scores, missing field or invalid timestamp"),
        (status = 500, description = "Ranking failed")
    ),
    tag = "ranking"
)]
pub async fn rank_contest(Json(req): Json<RankContestRequest>) -> WebResult<Response> {
    req.validate()?;

    let response = services::rank_contest(&req)?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/ranking/sections",
    request_body = FinalizeSectionsRequest,
    responses(
        (status = 200, description = "Final leaderboard merged from section leaderboards", body = LeaderboardResponse),
        (status = 400, description = "Empty sections, missing field or invalid timestamp"),
        (status = 500, description = "Ranking failed")
    ),
    tag = "ranking"
)]
pub async fn finalize_sections(Json(req): Json<FinalizeSectionsRequest>) -> WebResult<Response> {
    req.validate()?;

    let response = services::finalize_sections(&req)?;

    Ok(Json(response).into_response())
}
