use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::{
    dto::round::{
        NavigateRequest, RoundSummaryResponse, RoundView, ScorecardView, SetScoreRequest,
        StartRoundRequest,
    },
    error::AppError,
    services::round_service,
    state::SharedState,
};

/// Routes driving the working round.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/round",
            get(current_round).post(start_round).delete(discard_round),
        )
        .route("/round/scorecard", get(scorecard))
        .route("/round/scores", put(set_score))
        .route("/round/navigate", post(navigate))
        .route("/round/finalize", post(finalize_round))
}

/// Open a new round for the selected players.
#[utoipa::path(
    post,
    path = "/round",
    tag = "round",
    request_body = StartRoundRequest,
    responses(
        (status = 200, description = "Round started", body = RoundView),
        (status = 400, description = "Empty, duplicate or unknown selection"),
        (status = 409, description = "A round is already in progress")
    )
)]
pub async fn start_round(
    State(state): State<SharedState>,
    Json(payload): Json<StartRoundRequest>,
) -> Result<Json<RoundView>, AppError> {
    let view = round_service::start_round(&state, payload).await?;
    Ok(Json(view))
}

/// Hole-by-hole view of the working round.
#[utoipa::path(
    get,
    path = "/round",
    tag = "round",
    responses(
        (status = 200, description = "Working round", body = RoundView),
        (status = 404, description = "No round in progress")
    )
)]
pub async fn current_round(State(state): State<SharedState>) -> Result<Json<RoundView>, AppError> {
    let view = round_service::current_round(&state).await?;
    Ok(Json(view))
}

/// Full score grid of the working round.
#[utoipa::path(
    get,
    path = "/round/scorecard",
    tag = "round",
    responses(
        (status = 200, description = "Scorecard", body = ScorecardView),
        (status = 404, description = "No round in progress")
    )
)]
pub async fn scorecard(State(state): State<SharedState>) -> Result<Json<ScorecardView>, AppError> {
    let view = round_service::scorecard(&state).await?;
    Ok(Json(view))
}

/// Record a score for one participant on one hole.
#[utoipa::path(
    put,
    path = "/round/scores",
    tag = "round",
    request_body = SetScoreRequest,
    responses(
        (status = 200, description = "Score recorded", body = RoundView),
        (status = 400, description = "Score, hole or player out of range"),
        (status = 404, description = "No round in progress")
    )
)]
pub async fn set_score(
    State(state): State<SharedState>,
    Json(payload): Json<SetScoreRequest>,
) -> Result<Json<RoundView>, AppError> {
    let view = round_service::set_score(&state, payload).await?;
    Ok(Json(view))
}

/// Move to the previous or next hole.
#[utoipa::path(
    post,
    path = "/round/navigate",
    tag = "round",
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "Hole changed", body = RoundView),
        (status = 404, description = "No round in progress")
    )
)]
pub async fn navigate(
    State(state): State<SharedState>,
    Json(payload): Json<NavigateRequest>,
) -> Result<Json<RoundView>, AppError> {
    let view = round_service::navigate(&state, payload.direction).await?;
    Ok(Json(view))
}

/// Save the complete working round and return its results.
#[utoipa::path(
    post,
    path = "/round/finalize",
    tag = "round",
    responses(
        (status = 200, description = "Round saved", body = RoundSummaryResponse),
        (status = 409, description = "Round incomplete or none in progress"),
        (status = 503, description = "Local save failed")
    )
)]
pub async fn finalize_round(
    State(state): State<SharedState>,
) -> Result<Json<RoundSummaryResponse>, AppError> {
    let summary = round_service::finalize(&state).await?;
    Ok(Json(summary))
}

/// Drop the working round without saving it.
#[utoipa::path(
    delete,
    path = "/round",
    tag = "round",
    responses(
        (status = 204, description = "Round discarded"),
        (status = 409, description = "No round in progress")
    )
)]
pub async fn discard_round(State(state): State<SharedState>) -> Result<StatusCode, AppError> {
    round_service::discard(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}
