use axum::extract::{Path, State};
use axum::Json;
use contracts::dashboards::d400_sales_dashboard::{DashboardResponse, FilterOptions, FilterSelection};
use uuid::Uuid;

use crate::api::{ApiError, AppState};
use crate::dashboards::d400_sales_dashboard::service;

/// GET /api/d400/sessions/:id/filters
pub async fn filters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FilterOptions>, ApiError> {
    let dataset = state.sessions.get(id)?;
    Ok(Json(service::filter_options(&dataset)))
}

/// POST /api/d400/sessions/:id/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(selection): Json<FilterSelection>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let dataset = state.sessions.get(id)?;
    let response = service::build_dashboard(&dataset, &selection);
    tracing::debug!(
        "Dashboard for session {}: {} of {} rows",
        id,
        response.row_count,
        dataset.len()
    );
    Ok(Json(response))
}
