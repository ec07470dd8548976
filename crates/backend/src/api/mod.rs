pub mod error;
pub mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use crate::shared::session::SessionStore;
use crate::usecases::u502_insight_summary::InsightSummarizer;

pub use error::ApiError;

/// Общее состояние, которое получает каждый handler
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub template_path: Arc<PathBuf>,
    pub summarizer: Arc<InsightSummarizer>,
}

impl AppState {
    pub fn new(sessions: SessionStore, template_path: PathBuf, summarizer: InsightSummarizer) -> Self {
        Self {
            sessions,
            template_path: Arc::new(template_path),
            summarizer: Arc::new(summarizer),
        }
    }
}
