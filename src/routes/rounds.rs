use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::{
    dto::round::{HistoryEntry, RoundView},
    error::AppError,
    services::{round_service, stats_service},
    state::SharedState,
};

/// Routes over persisted rounds.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rounds", get(history))
        .route("/rounds/{id}", delete(delete_round))
        .route("/rounds/{id}/edit", post(edit_round))
}

/// Persisted rounds, newest first.
#[utoipa::path(
    get,
    path = "/rounds",
    tag = "rounds",
    responses((status = 200, description = "Round history", body = [HistoryEntry]))
)]
pub async fn history(State(state): State<SharedState>) -> Json<Vec<HistoryEntry>> {
    Json(stats_service::history(&state).await)
}

/// Reopen a persisted round as the working round.
#[utoipa::path(
    post,
    path = "/rounds/{id}/edit",
    tag = "rounds",
    params(("id" = String, Path, description = "Identifier of the round to edit")),
    responses(
        (status = 200, description = "Round reopened", body = RoundView),
        (status = 404, description = "Unknown round"),
        (status = 409, description = "A round is already in progress")
    )
)]
pub async fn edit_round(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<RoundView>, AppError> {
    let view = round_service::edit_round(&state, &id).await?;
    Ok(Json(view))
}

/// Delete a persisted round.
#[utoipa::path(
    delete,
    path = "/rounds/{id}",
    tag = "rounds",
    params(("id" = String, Path, description = "Identifier of the round to delete")),
    responses(
        (status = 204, description = "Round deleted"),
        (status = 404, description = "Unknown round"),
        (status = 409, description = "Round is being edited")
    )
)]
pub async fn delete_round(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    round_service::delete_round(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
