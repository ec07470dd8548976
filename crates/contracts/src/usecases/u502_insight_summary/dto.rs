use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightStatus {
    Generated,
    /// The text service failed; `notice` explains it to the user
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeSeverity {
    Info,
    Error,
}

/// Сообщение, которое UI показывает вместо сводки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightNotice {
    pub severity: NoticeSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightResponse {
    pub status: InsightStatus,
    pub summary: Option<String>,
    pub notice: Option<InsightNotice>,
}

impl InsightResponse {
    pub fn generated(summary: impl Into<String>) -> Self {
        Self {
            status: InsightStatus::Generated,
            summary: Some(summary.into()),
            notice: None,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: InsightStatus::Unavailable,
            summary: None,
            notice: Some(InsightNotice {
                severity: NoticeSeverity::Error,
                message: message.into(),
            }),
        }
    }

    /// No summary, with an informational (non-error) notice
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            status: InsightStatus::Unavailable,
            summary: None,
            notice: Some(InsightNotice {
                severity: NoticeSeverity::Info,
                message: message.into(),
            }),
        }
    }

    pub fn is_generated(&self) -> bool {
        self.status == InsightStatus::Generated
    }
}
