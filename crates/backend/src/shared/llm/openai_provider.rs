use super::types::{ChatMessage, ChatRole, Completion, LlmError, LlmProvider};
use crate::shared::config::LlmConfig;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

/// Провайдер для любого OpenAI-совместимого endpoint (Gemini, OpenAI, ...)
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiProvider {
    /// Создание из секции `[llm]`. Ключ берется из переменной окружения,
    /// имя которой задано в конфиге.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key().ok_or_else(|| {
            LlmError::NotConfigured(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;

        let client_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(config.endpoint.clone());

        Ok(Self {
            client: Client::with_config(client_config),
            model: config.model.clone(),
            temperature: config.temperature as f32,
            max_tokens: config.max_tokens.max(1) as u32,
        })
    }

    fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, LlmError> {
        let built: Result<ChatCompletionRequestMessage, _> = match message.role {
            ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map(Into::into),
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map(Into::into),
        };
        built.map_err(|e| LlmError::BadRequest(e.to_string()))
    }

    /// Разбор ошибки клиента по тексту сообщения
    fn classify_error(message: String) -> LlmError {
        let lower = message.to_lowercase();
        if lower.contains("401") || lower.contains("403") || lower.contains("authentication") {
            LlmError::Auth(message)
        } else if lower.contains("429")
            || lower.contains("rate limit")
            || lower.contains("quota")
            || lower.contains("resource_exhausted")
        {
            LlmError::QuotaExhausted
        } else if lower.contains("error sending request") || lower.contains("connection") {
            LlmError::Network(message)
        } else {
            LlmError::Service(message)
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, LlmError> {
        let request_messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .build()
            .map_err(|e| LlmError::BadRequest(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| Self::classify_error(e.to_string()))?;

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        Ok(Completion {
            text,
            model: response.model,
            tokens_used: response.usage.map(|u| u.total_tokens),
        })
    }

    fn name(&self) -> &str {
        "OpenAI-compatible"
    }
}
