use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::domain::a001_sales_record::ApiErrorBody;

use crate::domain::a001_sales_record::DatasetError;
use crate::shared::session::SessionError;
use crate::usecases::u501_export_report::TemplateError;

/// Ответ с ошибкой: статус код и JSON `ApiErrorBody`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody::new(message),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        tracing::warn!("{}", err);
        Self::new(StatusCode::NOT_FOUND, err.to_string())
    }
}

impl From<DatasetError> for ApiError {
    fn from(err: DatasetError) -> Self {
        tracing::warn!("Dataset rejected: {}", err);
        match err {
            DatasetError::MissingColumns { ref missing } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                body: ApiErrorBody {
                    error: err.to_string(),
                    missing_columns: missing.clone(),
                },
            },
            DatasetError::CsvExport(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            _ => Self::bad_request(err.to_string()),
        }
    }
}

impl From<TemplateError> for ApiError {
    fn from(err: TemplateError) -> Self {
        tracing::error!("Report export failed: {}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let missing = ApiError::from(DatasetError::MissingColumns {
            missing: vec!["Sales".to_string()],
        });
        assert_eq!(missing.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(missing.body.missing_columns, vec!["Sales"]);

        let parse = ApiError::from(DatasetError::Parse("bad quote".to_string()));
        assert_eq!(parse.status, StatusCode::BAD_REQUEST);

        let session = ApiError::from(SessionError::NotFound(uuid::Uuid::nil()));
        assert_eq!(session.status, StatusCode::NOT_FOUND);

        let template = ApiError::from(TemplateError::NotFound("x.xlsx".to_string()));
        assert_eq!(template.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(template.body.error.contains("x.xlsx"));
    }
}
