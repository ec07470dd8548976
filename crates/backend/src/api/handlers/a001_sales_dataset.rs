use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::domain::a001_sales_record::{CreateSessionRequest, SessionInfo};
use uuid::Uuid;

use crate::api::{ApiError, AppState};
use crate::domain::a001_sales_record::csv_export::{self, SAMPLE_CSV_FILE_NAME};
use crate::domain::a001_sales_record::{service, Dataset};

const UPLOAD_FIELD: &str = "file";

fn session_info(session_id: Uuid, dataset: &Dataset) -> SessionInfo {
    SessionInfo {
        session_id,
        row_count: dataset.len(),
        origin: dataset.origin().clone(),
        loaded_at: dataset.loaded_at(),
    }
}

/// POST /api/a001/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionInfo>, ApiError> {
    let dataset = service::generate_dataset(request.seed);
    let row_count = dataset.len();
    let session_id = state.sessions.create(dataset);
    tracing::info!("Session {} created with {} generated rows", session_id, row_count);

    let dataset = state.sessions.get(session_id)?;
    Ok(Json(session_info(session_id, &dataset)))
}

/// POST /api/a001/sessions/:id/regenerate
pub async fn regenerate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionInfo>, ApiError> {
    let dataset = state
        .sessions
        .replace(id, service::generate_dataset(request.seed))?;
    tracing::info!("Session {} regenerated: {} rows", id, dataset.len());
    Ok(Json(session_info(id, &dataset)))
}

/// POST /api/a001/sessions/:id/upload (multipart, field "file")
pub async fn upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SessionInfo>, ApiError> {
    // неизвестная сессия: отказываем до чтения тела
    state.sessions.get(id)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Error reading file: {}", e)))?;

        let dataset = service::load_uploaded_dataset(&file_name, &bytes)?;
        let dataset = state.sessions.replace(id, dataset)?;
        return Ok(Json(session_info(id, &dataset)));
    }

    Err(ApiError::bad_request(format!(
        "Multipart field '{}' is missing",
        UPLOAD_FIELD
    )))
}

/// GET /api/a001/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionInfo>, ApiError> {
    let dataset = state.sessions.get(id)?;
    Ok(Json(session_info(id, &dataset)))
}

/// DELETE /api/a001/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(id)?;
    tracing::info!("Session {} closed, {} left", id, state.sessions.len());
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/a001/sessions/:id/sample.csv
pub async fn download_csv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let dataset = state.sessions.get(id)?;
    let bytes = csv_export::to_csv(dataset.records())?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", SAMPLE_CSV_FILE_NAME),
            ),
        ],
        bytes,
    )
        .into_response())
}
