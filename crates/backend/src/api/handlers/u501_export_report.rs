use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use contracts::dashboards::d400_sales_dashboard::FilterSelection;
use contracts::usecases::u501_export_report::{report_file_name, REPORT_MIME_TYPE};
use uuid::Uuid;

use crate::api::{ApiError, AppState};
use crate::dashboards::d400_sales_dashboard::service::filtered_view;
use crate::usecases::u501_export_report::{export_report, ReportTemplate, TemplateLayout};

/// POST /api/u501/sessions/:id/export
///
/// Заполняет шаблон отчета отфильтрованными строками. Шаблон читается с диска
/// на каждый запрос, правки в нем применяются без перезапуска.
pub async fn export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(selection): Json<FilterSelection>,
) -> Result<Response, ApiError> {
    let dataset = state.sessions.get(id)?;
    let records = filtered_view(&dataset, &selection);

    let template = ReportTemplate::load(&state.template_path, TemplateLayout::default())?;
    let now = Local::now().naive_local();
    let bytes = export_report(&template, &records, now)?;
    let file_name = report_file_name(now.date());

    tracing::info!(
        "Report {} exported for session {}: {} rows, {} bytes",
        file_name,
        id,
        records.len(),
        bytes.len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, REPORT_MIME_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}
