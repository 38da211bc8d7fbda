use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::player::{CreatePlayerRequest, PlayerSummary},
    error::AppError,
    services::roster_service,
    state::SharedState,
};

/// Roster routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/players", get(list_players).post(create_player))
}

/// List registered players with their handicaps.
#[utoipa::path(
    get,
    path = "/players",
    tag = "players",
    responses((status = 200, description = "Roster", body = [PlayerSummary]))
)]
pub async fn list_players(State(state): State<SharedState>) -> Json<Vec<PlayerSummary>> {
    Json(roster_service::list_players(&state).await)
}

/// Register a new player.
#[utoipa::path(
    post,
    path = "/players",
    tag = "players",
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Player created", body = PlayerSummary),
        (status = 400, description = "Blank or overlong name")
    )
)]
pub async fn create_player(
    State(state): State<SharedState>,
    Json(payload): Json<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<PlayerSummary>), AppError> {
    let summary = roster_service::add_player(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}
