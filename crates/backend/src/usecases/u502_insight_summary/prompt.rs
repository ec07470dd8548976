use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::dashboards::d400_sales_dashboard::aggregation::{AggregateSummary, Dimension};
use crate::shared::llm::ChatMessage;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `{"Region": {"Total": {...}, "Average": {...}}, "Rep": ..., "Product": ...}`,
/// values rounded to one decimal
pub fn breakdown_json(summary: &AggregateSummary) -> Value {
    let mut root = Map::new();
    for dimension in Dimension::ALL {
        let stats = summary.breakdown(dimension);
        let totals: BTreeMap<&str, f64> = stats
            .iter()
            .map(|(category, s)| (category.as_str(), round1(s.total)))
            .collect();
        let averages: BTreeMap<&str, f64> = stats
            .iter()
            .map(|(category, s)| (category.as_str(), round1(s.mean)))
            .collect();
        root.insert(
            dimension.column().to_string(),
            json!({ "Total": totals, "Average": averages }),
        );
    }
    Value::Object(root)
}

/// Инструкции аналитика, уходят отдельным system-сообщением
pub const ANALYST_INSTRUCTIONS: &str = "You're an AI assistant summarizing sales performance.\n\
     Give 1 short paragraph of insight based on the breakdown by region, rep, and product.\n\
     Respond only with the paragraph.";

/// Данные запроса: период и JSON разбивка
pub fn build_prompt(summary: &AggregateSummary) -> String {
    let period = match (summary.min_date, summary.max_date) {
        (Some(min), Some(max)) => format!("{} to {}", min, max),
        _ => "n/a".to_string(),
    };

    format!("Data period: {}.\n\n{}", period, breakdown_json(summary))
}

pub fn build_messages(summary: &AggregateSummary) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(ANALYST_INSTRUCTIONS),
        ChatMessage::user(build_prompt(summary)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::shared::llm::ChatRole;
    use contracts::domain::a001_sales_record::SalesRecord;

    #[test]
    fn test_prompt_contains_period_and_rounded_stats() {
        let date = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let records = vec![
            SalesRecord::new(date(1), "North", "Alice", "Widget A", 100.04),
            SalesRecord::new(date(3), "North", "Bob", "Widget A", 50.0),
        ];
        let summary = AggregateSummary::compute(&records);

        let breakdown = breakdown_json(&summary);
        assert_eq!(breakdown["Region"]["Total"]["North"], json!(150.0));
        assert_eq!(breakdown["Region"]["Average"]["North"], json!(75.0));
        assert_eq!(breakdown["Rep"]["Total"]["Alice"], json!(100.0));
        assert_eq!(breakdown["Product"]["Total"]["Widget A"], json!(150.0));

        let prompt = build_prompt(&summary);
        assert!(prompt.contains("Data period: 2024-01-01 to 2024-01-03."));
        assert!(prompt.contains("\"Widget A\""));
    }

    #[test]
    fn test_empty_summary_prompt() {
        let prompt = build_prompt(&AggregateSummary::compute(&[]));
        assert!(prompt.contains("Data period: n/a."));
    }

    #[test]
    fn test_messages_split_instructions_from_data() {
        let messages = build_messages(&AggregateSummary::compute(&[]));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[0].content, ANALYST_INSTRUCTIONS);
        assert_eq!(messages[1].role, ChatRole::User);
        assert!(messages[1].content.starts_with("Data period:"));
    }
}
