use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::api::{handlers, AppState};

/// Загружаются целые таблицы, лимита axum по умолчанию (2 MB) не хватает
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Sales dataset: sessions, generation, upload
        .route(
            "/api/a001/sessions",
            post(handlers::a001_sales_dataset::create_session),
        )
        .route(
            "/api/a001/sessions/:id",
            get(handlers::a001_sales_dataset::get_session)
                .delete(handlers::a001_sales_dataset::delete_session),
        )
        .route(
            "/api/a001/sessions/:id/regenerate",
            post(handlers::a001_sales_dataset::regenerate),
        )
        .route(
            "/api/a001/sessions/:id/upload",
            post(handlers::a001_sales_dataset::upload)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/a001/sessions/:id/sample.csv",
            get(handlers::a001_sales_dataset::download_csv),
        )
        // D400 Sales dashboard
        .route(
            "/api/d400/sessions/:id/filters",
            get(handlers::d400_sales_dashboard::filters),
        )
        .route(
            "/api/d400/sessions/:id/dashboard",
            post(handlers::d400_sales_dashboard::dashboard),
        )
        // UseCase u501: Export report
        .route(
            "/api/u501/sessions/:id/export",
            post(handlers::u501_export_report::export),
        )
        // UseCase u502: Insight summary
        .route(
            "/api/u502/sessions/:id/summary",
            post(handlers::u502_insight_summary::summary),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::session::SessionStore;
    use crate::usecases::u502_insight_summary::executor::UNAVAILABLE_NOTICE;
    use crate::usecases::u502_insight_summary::InsightSummarizer;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use contracts::dashboards::d400_sales_dashboard::DashboardResponse;
    use contracts::domain::a001_sales_record::{ApiErrorBody, SessionInfo};
    use contracts::usecases::u501_export_report::REPORT_MIME_TYPE;
    use contracts::usecases::u502_insight_summary::{InsightResponse, InsightStatus};
    use serde::de::DeserializeOwned;
    use std::path::PathBuf;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let template = PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../assets/sales_report_template.xlsx"
        ));
        AppState::new(
            SessionStore::default(),
            template,
            InsightSummarizer::new(None, Duration::from_secs(1)),
        )
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_session(app: &Router, seed: u64) -> SessionInfo {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/a001/sessions",
                &format!(r#"{{"seed":{}}}"#, seed),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        read_json(response).await
    }

    #[tokio::test]
    async fn test_health() {
        let app = configure_routes(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_seeded_sessions_match() {
        let app = configure_routes(test_state());
        let first = create_session(&app, 42).await;
        let second = create_session(&app, 42).await;

        assert_ne!(first.session_id, second.session_id);
        assert_eq!(first.row_count, second.row_count);
        assert!(first.row_count > 0);

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/a001/sessions/{}", first.session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let info: SessionInfo = read_json(response).await;
        assert_eq!(info.row_count, first.row_count);
    }

    #[tokio::test]
    async fn test_delete_session_frees_it() {
        let state = test_state();
        let app = configure_routes(state.clone());
        let kept = create_session(&app, 11).await;
        let closed = create_session(&app, 12).await;
        assert_eq!(state.sessions.len(), 2);

        let uri = format!("/api/a001/sessions/{}", closed.session_id);
        let response = app
            .clone()
            .oneshot(Request::delete(uri.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.sessions.len(), 1);
        assert!(state.sessions.get(kept.session_id).is_ok());

        let response = app
            .oneshot(Request::delete(uri.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dashboard_respects_filter() {
        let app = configure_routes(test_state());
        let session = create_session(&app, 7).await;
        let uri = format!("/api/d400/sessions/{}/dashboard", session.session_id);

        let response = app
            .clone()
            .oneshot(json_request("POST", &uri, "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let all: DashboardResponse = read_json(response).await;
        assert_eq!(all.row_count, session.row_count);
        assert_eq!(all.sales_by_region.title, "Sales by Region");

        let response = app
            .oneshot(json_request("POST", &uri, r#"{"regions":["North"]}"#))
            .await
            .unwrap();
        let north: DashboardResponse = read_json(response).await;
        assert!(north.row_count <= all.row_count);
        assert!(north.rows.iter().all(|r| r.region == "North"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = configure_routes(test_state());
        let uri = format!("/api/d400/sessions/{}/filters", uuid::Uuid::new_v4());
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ApiErrorBody = read_json(response).await;
        assert!(body.error.contains("not found"));
    }

    #[tokio::test]
    async fn test_summary_without_provider_is_unavailable() {
        let app = configure_routes(test_state());
        let session = create_session(&app, 1).await;
        let uri = format!("/api/u502/sessions/{}/summary", session.session_id);

        let response = app.oneshot(json_request("POST", &uri, "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let insight: InsightResponse = read_json(response).await;
        assert_eq!(insight.status, InsightStatus::Unavailable);
        assert_eq!(insight.notice.unwrap().message, UNAVAILABLE_NOTICE);
    }

    #[tokio::test]
    async fn test_export_returns_workbook() {
        let app = configure_routes(test_state());
        let session = create_session(&app, 3).await;
        let uri = format!("/api/u501/sessions/{}/export", session.session_id);

        let response = app.oneshot(json_request("POST", &uri, "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            REPORT_MIME_TYPE
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("Executive Summary Report"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn test_export_with_missing_template_fails() {
        let state = AppState::new(
            SessionStore::default(),
            PathBuf::from("does/not/exist.xlsx"),
            InsightSummarizer::new(None, Duration::from_secs(1)),
        );
        let app = configure_routes(state);
        let session = create_session(&app, 3).await;
        let uri = format!("/api/u501/sessions/{}/export", session.session_id);

        let response = app.oneshot(json_request("POST", &uri, "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ApiErrorBody = read_json(response).await;
        assert!(body.error.contains("exist.xlsx"));
    }

    fn multipart_request(uri: &str, file_name: &str, content: &str) -> Request<Body> {
        let boundary = "sales-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = boundary,
            f = file_name,
            c = content
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_replaces_dataset() {
        let app = configure_routes(test_state());
        let session = create_session(&app, 5).await;
        let uri = format!("/api/a001/sessions/{}/upload", session.session_id);
        let csv = "Date,Region,Rep,Product,Sales\n2024-01-01,North,Alice,Laptop,100\n2024-01-02,South,Bob,Phone,50.5\n";

        let response = app.oneshot(multipart_request(&uri, "sales.csv", csv)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let info: SessionInfo = read_json(response).await;
        assert_eq!(info.row_count, 2);
    }

    #[tokio::test]
    async fn test_upload_with_missing_columns_is_rejected() {
        let app = configure_routes(test_state());
        let session = create_session(&app, 5).await;
        let uri = format!("/api/a001/sessions/{}/upload", session.session_id);
        let csv = "Date,Region,Product\n2024-01-01,North,Laptop\n";

        let response = app
            .clone()
            .oneshot(multipart_request(&uri, "sales.csv", csv))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ApiErrorBody = read_json(response).await;
        assert_eq!(body.missing_columns, vec!["Rep", "Sales"]);

        // прежний датасет остается на месте
        let response = app
            .oneshot(
                Request::get(format!("/api/a001/sessions/{}", session.session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let info: SessionInfo = read_json(response).await;
        assert_eq!(info.row_count, session.row_count);
    }

    #[tokio::test]
    async fn test_sample_csv_download() {
        let app = configure_routes(test_state());
        let session = create_session(&app, 9).await;
        let uri = format!("/api/a001/sessions/{}/sample.csv", session.session_id);

        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("dummy_sales_data.csv"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("Date,Region,Rep,Product,Sales"));
        assert_eq!(text.lines().count(), session.row_count + 1);
    }
}
