use std::sync::Arc;
use std::time::Duration;

use contracts::domain::a001_sales_record::SalesRecord;
use contracts::usecases::u502_insight_summary::InsightResponse;

use super::prompt::build_messages;
use crate::dashboards::d400_sales_dashboard::aggregation::AggregateSummary;
use crate::shared::config::LlmConfig;
use crate::shared::llm::{LlmError, LlmProvider, OpenAiProvider};

/// Уведомление вместо сводки, если текстовый сервис не ответил
pub const UNAVAILABLE_NOTICE: &str =
    "AI quota limit reached for this dashboard – could not generate insight summary.";

pub const EMPTY_VIEW_NOTICE: &str = "No rows match the current filters, nothing to summarize.";

/// Превращает отфильтрованные строки в короткую сводку через LLM провайдер.
///
/// Не возвращает ошибок: любая проблема провайдера логируется и дает ответ
/// `Unavailable`. Одна попытка на вызов, без повторов.
pub struct InsightSummarizer {
    provider: Option<Arc<dyn LlmProvider>>,
    timeout: Duration,
}

impl InsightSummarizer {
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Провайдер из секции `[llm]`; без API ключа сервис работает,
    /// но отвечает уведомлением
    pub fn from_config(config: &LlmConfig) -> Self {
        let provider: Option<Arc<dyn LlmProvider>> = match OpenAiProvider::from_config(config) {
            Ok(provider) => {
                tracing::info!(
                    "Insight summaries use model {} at {}",
                    config.model,
                    config.endpoint
                );
                Some(Arc::new(provider))
            }
            Err(e) => {
                tracing::debug!("No text service provider: {}", e);
                None
            }
        };
        Self::new(provider, Duration::from_secs(config.timeout_secs.max(1)))
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn summarize(&self, records: &[SalesRecord]) -> InsightResponse {
        if records.is_empty() {
            return InsightResponse::info(EMPTY_VIEW_NOTICE);
        }

        match self.request_summary(records).await {
            Ok(text) => InsightResponse::generated(text.trim()),
            Err(e) => {
                tracing::warn!("Insight summary failed: {}", e);
                InsightResponse::unavailable(UNAVAILABLE_NOTICE)
            }
        }
    }

    async fn request_summary(&self, records: &[SalesRecord]) -> Result<String, LlmError> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            LlmError::NotConfigured("no API key for the text service".to_string())
        })?;

        let summary = AggregateSummary::compute(records);
        let messages = build_messages(&summary);

        let completion = tokio::time::timeout(self.timeout, provider.complete(&messages))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))??;

        tracing::debug!(
            "Insight summary from {} ({}), tokens: {:?}",
            provider.name(),
            completion.model,
            completion.tokens_used
        );
        Ok(completion.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::llm::{ChatMessage, ChatRole, Completion};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use contracts::usecases::u502_insight_summary::{InsightStatus, NoticeSeverity};
    use std::sync::Mutex;

    enum Behaviour {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct MockProvider {
        behaviour: Behaviour,
        prompts: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, LlmError> {
            assert_eq!(messages.first().map(|m| m.role), Some(ChatRole::System));
            self.prompts.lock().unwrap().extend(
                messages
                    .iter()
                    .filter(|m| m.role == ChatRole::User)
                    .map(|m| m.content.clone()),
            );
            match self.behaviour {
                Behaviour::Reply(text) => Ok(Completion {
                    text: text.to_string(),
                    model: "mock".to_string(),
                    tokens_used: Some(42),
                }),
                Behaviour::Fail => Err(LlmError::QuotaExhausted),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(LlmError::Network("unreachable".to_string()))
                }
            }
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn records() -> Vec<SalesRecord> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        vec![SalesRecord::new(date, "North", "Alice", "Widget A", 100.0)]
    }

    #[tokio::test]
    async fn test_generated_summary() {
        let provider = MockProvider::new(Behaviour::Reply("  North carried the month.\n"));
        let summarizer = InsightSummarizer::new(Some(provider.clone()), Duration::from_secs(5));

        let response = summarizer.summarize(&records()).await;
        assert!(response.is_generated());
        assert_eq!(response.summary.as_deref(), Some("North carried the month."));

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Data period: 2024-01-01 to 2024-01-01."));
    }

    #[tokio::test]
    async fn test_provider_failure_degrades() {
        let provider = MockProvider::new(Behaviour::Fail);
        let summarizer = InsightSummarizer::new(Some(provider), Duration::from_secs(5));

        let response = summarizer.summarize(&records()).await;
        assert_eq!(response.status, InsightStatus::Unavailable);
        assert!(response.summary.is_none());
        let notice = response.notice.unwrap();
        assert_eq!(notice.severity, NoticeSeverity::Error);
        assert_eq!(notice.message, UNAVAILABLE_NOTICE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades() {
        let provider = MockProvider::new(Behaviour::Hang);
        let summarizer = InsightSummarizer::new(Some(provider), Duration::from_secs(30));

        let response = summarizer.summarize(&records()).await;
        assert_eq!(response.status, InsightStatus::Unavailable);
    }

    #[tokio::test]
    async fn test_unconfigured_summarizer_degrades() {
        let summarizer = InsightSummarizer::new(None, Duration::from_secs(5));
        assert!(!summarizer.is_configured());
        let response = summarizer.summarize(&records()).await;
        assert_eq!(response.notice.unwrap().message, UNAVAILABLE_NOTICE);
    }

    #[tokio::test]
    async fn test_empty_view_skips_provider() {
        let provider = MockProvider::new(Behaviour::Reply("unused"));
        let summarizer = InsightSummarizer::new(Some(provider.clone()), Duration::from_secs(5));

        let response = summarizer.summarize(&[]).await;
        assert_eq!(response.status, InsightStatus::Unavailable);
        assert_eq!(response.notice.unwrap().severity, NoticeSeverity::Info);
        assert!(provider.prompts.lock().unwrap().is_empty());
    }
}
