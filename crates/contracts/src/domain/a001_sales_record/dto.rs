use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Откуда взят датасет сессии
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetOrigin {
    /// Synthetic data; `seed` is set when the caller asked for a reproducible dataset
    Generated { seed: Option<u64> },
    /// File uploaded by the user
    Uploaded { file_name: String },
}

/// Запрос на создание сессии (или перегенерацию данных)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Состояние сессии, видимое клиенту
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub row_count: usize,
    pub origin: DatasetOrigin,
    pub loaded_at: DateTime<Utc>,
}

/// Тело ответа API с ошибкой
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    /// Required columns absent from an upload, sorted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
}

impl ApiErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            missing_columns: Vec::new(),
        }
    }
}
