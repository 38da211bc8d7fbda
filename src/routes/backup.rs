use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    dto::backup::{ExportFile, ImportSummary},
    error::AppError,
    services::backup_service,
    state::SharedState,
};

/// Export and import routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/export/csv", get(export_csv))
        .route("/export/json", get(export_json))
        .route("/import", post(import))
}

fn attachment(file: ExportFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.body,
    )
        .into_response()
}

/// Download every recorded score as CSV.
#[utoipa::path(
    get,
    path = "/export/csv",
    tag = "backup",
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String),
        (status = 409, description = "No rounds to export")
    )
)]
pub async fn export_csv(State(state): State<SharedState>) -> Result<Response, AppError> {
    let file = backup_service::export_csv(&state).await?;
    Ok(attachment(file))
}

/// Download the full data set as a JSON backup.
#[utoipa::path(
    get,
    path = "/export/json",
    tag = "backup",
    responses((status = 200, description = "JSON backup", content_type = "application/json", body = String))
)]
pub async fn export_json(State(state): State<SharedState>) -> Result<Response, AppError> {
    let file = backup_service::export_json(&state).await?;
    Ok(attachment(file))
}

/// Replace all players and rounds with a JSON backup.
#[utoipa::path(
    post,
    path = "/import",
    tag = "backup",
    request_body(content = String, content_type = "application/json", description = "Backup produced by /export/json"),
    responses(
        (status = 200, description = "Backup imported", body = ImportSummary),
        (status = 400, description = "Unreadable or invalid backup")
    )
)]
pub async fn import(
    State(state): State<SharedState>,
    body: String,
) -> Result<Json<ImportSummary>, AppError> {
    let summary = backup_service::import(&state, &body).await?;
    Ok(Json(summary))
}
