use axum::{
    routing::get,
    Router,
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tower_http::cors::{CorsLayer, Any};

use crate::error::Result;
use crate::api::models::FeedResponse;
use crate::{github, rss, AppState};

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/github/:username", get(github_handler))
        .route("/api/medium/:username", get(medium_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

/// Proxy a GitHub GraphQL profile query, returning the upstream body
/// untouched.
async fn github_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse> {
    tracing::info!("Fetching GitHub profile for {}", username);
    let body = github::fetch_profile(&state.config.github_token, &username).await?;
    Ok(Json(body))
}

/// Fetch and normalize a Medium RSS feed.
async fn medium_handler(Path(username): Path<String>) -> Result<impl IntoResponse> {
    tracing::info!("Fetching Medium feed for @{}", username);
    let (feed, items) = rss::fetch_feed(&username).await?;
    Ok(Json(FeedResponse {
        status: "ok".to_string(),
        feed,
        items,
    }))
}
