use axum::extract::{Path, State};
use axum::Json;
use contracts::dashboards::d400_sales_dashboard::FilterSelection;
use contracts::usecases::u502_insight_summary::InsightResponse;
use uuid::Uuid;

use crate::api::{ApiError, AppState};
use crate::dashboards::d400_sales_dashboard::service::filtered_view;

/// POST /api/u502/sessions/:id/summary
///
/// Ошибки сервиса возвращаются как 200 с уведомлением, а не как статус ошибки.
pub async fn summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(selection): Json<FilterSelection>,
) -> Result<Json<InsightResponse>, ApiError> {
    let dataset = state.sessions.get(id)?;
    let records = filtered_view(&dataset, &selection);
    Ok(Json(state.summarizer.summarize(&records).await))
}
