use axum::body::to_bytes;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::shared::format::format_number;

/// Middleware для логирования HTTP запросов
///
/// Выводит длительность, размер ответа, статус код, метод и путь.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Читаем тело ответа, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                "{} {} -> {} | {}ms | body error: {}",
                method,
                uri.path(),
                parts.status.as_u16(),
                start.elapsed().as_millis(),
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let duration = start.elapsed();
    if parts.status.is_success() {
        tracing::info!(
            "{} {} -> {} | {:>5}ms | {:>10} bytes",
            method,
            uri.path(),
            parts.status.as_u16(),
            duration.as_millis(),
            format_number(bytes.len())
        );
    } else {
        tracing::warn!(
            "{} {} -> {} | {:>5}ms | {:>10} bytes",
            method,
            uri.path(),
            parts.status.as_u16(),
            duration.as_millis(),
            format_number(bytes.len())
        );
    }

    Response::from_parts(parts, Body::from(bytes))
}
