use axum::{Router, routing::post};

use super::handlers::{finalize_sections, rank_contest};

pub fn routes() -> Router {
    Router::new()
        .route("/contest", post(rank_contest))
        .route("/sections", post(finalize_sections))
}
