use async_trait::async_trait;
use thiserror::Error;

/// Ошибки обращения к текстовому сервису
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Text service is not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Request rejected: {0}")]
    BadRequest(String),

    /// Квота исчерпана или слишком много запросов
    #[error("Quota or rate limit exhausted")]
    QuotaExhausted,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Service returned an empty completion")]
    EmptyCompletion,

    #[error("No answer within {0} s")]
    Timeout(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// Инструкции аналитика
    System,
    /// Данные для анализа
    User,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Текст, который вернула модель
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub tokens_used: Option<u32>,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Один запрос, без повторов
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, LlmError>;

    /// Имя для логов
    fn name(&self) -> &str;
}
