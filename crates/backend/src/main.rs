pub mod api;
pub mod dashboards;
pub mod domain;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

use axum::http::{header, Method};
use axum::middleware;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::api::AppState;
use crate::shared::config::{get_template_path, load_config};
use crate::shared::session::SessionStore;
use crate::system::middleware::request_logger::request_logger;
use crate::usecases::u502_insight_summary::InsightSummarizer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = load_config()?;

    let template_path = get_template_path(&config);
    if template_path.exists() {
        tracing::info!("Report template: {}", template_path.display());
    } else {
        tracing::warn!(
            "Report template {} not found, report export will fail until it is in place",
            template_path.display()
        );
    }

    let summarizer = InsightSummarizer::from_config(&config.llm);
    if !summarizer.is_configured() {
        tracing::warn!(
            "{} is not set, insight summaries are disabled",
            config.llm.api_key_env
        );
    }

    let sessions = SessionStore::new(config.server.max_sessions);
    let state = AppState::new(sessions, template_path, summarizer);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION]);

    let app = routes::configure_routes(state)
        .layer(middleware::from_fn(request_logger))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server listening on http://{}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Port {} is already in use. Stop the other process or change [server].port in config.toml",
                    config.server.port
                );
            } else {
                tracing::error!("Failed to bind {}: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;
    Ok(())
}
