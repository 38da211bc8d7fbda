use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::stats::{HoleDifficultyDto, LeaderboardsResponse, PlayerAnalyticsResponse},
    error::AppError,
    services::stats_service,
    state::SharedState,
};

/// Read-only statistics routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/players/{id}/analytics", get(player_analytics))
        .route("/leaderboards", get(leaderboards))
        .route("/course/difficulty", get(course_difficulty))
}

/// Career numbers and handicap timeline of a player.
#[utoipa::path(
    get,
    path = "/players/{id}/analytics",
    tag = "stats",
    params(("id" = String, Path, description = "Identifier of the player")),
    responses(
        (status = 200, description = "Player analytics", body = PlayerAnalyticsResponse),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn player_analytics(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PlayerAnalyticsResponse>, AppError> {
    let analytics = stats_service::analytics(&state, &id).await?;
    Ok(Json(analytics))
}

/// Ten best rounds overall and per course.
#[utoipa::path(
    get,
    path = "/leaderboards",
    tag = "stats",
    responses((status = 200, description = "Leaderboards", body = LeaderboardsResponse))
)]
pub async fn leaderboards(State(state): State<SharedState>) -> Json<LeaderboardsResponse> {
    Json(stats_service::leaderboards(&state).await)
}

/// Holes ranked by average strokes over par.
#[utoipa::path(
    get,
    path = "/course/difficulty",
    tag = "stats",
    responses((status = 200, description = "Course difficulty", body = [HoleDifficultyDto]))
)]
pub async fn course_difficulty(State(state): State<SharedState>) -> Json<Vec<HoleDifficultyDto>> {
    Json(stats_service::course_difficulty(&state).await)
}
