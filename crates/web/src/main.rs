use std::time::Duration;

use anyhow::Context;
use axum::{Router, http::HeaderValue};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;

use config::Config;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::ranking::handlers::rank_contest,
        features::ranking::handlers::finalize_sections,
    ),
    components(
        schemas(
            scoring::dto::ranking::RankContestRequest,
            scoring::dto::ranking::ScoreSubmission,
            scoring::dto::ranking::FinalizeSectionsRequest,
            scoring::dto::ranking::SectionEntry,
            scoring::dto::ranking::LeaderboardRow,
            scoring::dto::ranking::LeaderboardResponse,
        )
    ),
    tags(
        (name = "ranking", description = "Contest ranking endpoints"),
    )
)]
struct ApiDoc;

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors = match &config.cors_allowed_origin {
        Some(origin) => {
            let origin: HeaderValue = origin
                .parse()
                .context("CORS_ALLOWED_ORIGIN is not a valid origin")?;

            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        }
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    Ok(cors.max_age(Duration::from_secs(3600)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting contest ranking API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    match &config.cors_allowed_origin {
        Some(origin) => tracing::info!("CORS restricted to {}", origin),
        None => tracing::info!("CORS open to any origin"),
    }

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/ranking", features::ranking::routes::routes())
        .layer(cors_layer(&config)?)
        .layer(TraceLayer::new_for_http());

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app).await?;

    Ok(())
}
