//! Customer support sentiment and ticket volume trends.

use crate::agents::matches_any;
use crate::domain::models::{AgentCapability, AgentMetadata, AgentRecommendation, AgentResult, AgentTask};
use crate::domain::ports::tool_transport::ToolTransport;
use crate::domain::ports::{Agent, AgentContext};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

const CANNOT_HANDLE_PATTERNS: &[&str] = &["common issue", "period over period", "compare", "versus", " vs ", "staffing", "agent performance"];

const NEGATIVE_SENTIMENT_THRESHOLD: f64 = 0.4;

pub struct SupportAgent {
    tools: Arc<dyn ToolTransport>,
}

impl SupportAgent {
    pub fn new(tools: Arc<dyn ToolTransport>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Agent for SupportAgent {
    fn get_metadata(&self) -> AgentMetadata {
        AgentMetadata {
            name: "support",
            display_name: "SUPPORT",
            description: "Tracks support ticket sentiment and volume trends.",
            capabilities: vec![
                AgentCapability {
                    name: "sentiment_analysis",
                    description: "Summarize customer sentiment across recent tickets",
                    parameters: &["window_days"],
                    example_queries: ["How are customers feeling about us lately?", "Any spike in angry tickets?"],
                },
                AgentCapability {
                    name: "ticket_trends",
                    description: "Surface the most common issue types and their trend",
                    parameters: &["window_days"],
                    example_queries: ["What are the top support ticket categories?", "Are tickets about shipping up?"],
                },
            ],
            keywords: vec!["support", "ticket", "complaint", "sentiment", "customer", "issue"],
            priority_boost_phrases: vec!["angry", "complaint spike", "urgent"],
        }
    }

    async fn run(&self, task: &AgentTask, _context: &AgentContext<'_>) -> AgentResult {
        if matches_any(task.query().unwrap_or_default(), CANNOT_HANDLE_PATTERNS) {
            let reason = "query requires cross-domain analysis, period-over-period comparison, or common-issue aggregation outside the support agent's core capabilities".to_string();
            return AgentResult::CannotHandle {
                insights: vec![reason.clone()],
                reason,
                suggested_agent: Some("data_analyst".to_string()),
            };
        }

        match task.mode() {
            Some("ticket_trends") => self.run_ticket_trends(task).await,
            _ => self.run_sentiment_analysis(task).await,
        }
    }
}

impl SupportAgent {
    async fn run_sentiment_analysis(&self, task: &AgentTask) -> AgentResult {
        let window_days = task.parameters.get("window_days").and_then(Value::as_i64).unwrap_or(7);

        let result = self.tools.invoke("get_support_sentiment", json!({"window_days": window_days})).await;

        let response = match result {
            Ok(v) => v,
            Err(e) => return AgentResult::Failure { error: e.to_string() },
        };

        let negative_ratio = response.get("negative_ratio").and_then(Value::as_f64).unwrap_or(0.0);
        let total_tickets = response.get("total_tickets").and_then(Value::as_i64).unwrap_or(0);

        let mut findings = BTreeMap::new();
        findings.insert("sentiment".to_string(), response.clone());

        let mut insights = vec![format!(
            "{total_tickets} tickets in the last {window_days} days, {:.0}% negative.",
            negative_ratio * 100.0
        )];
        let mut recommendations = Vec::new();

        if negative_ratio >= NEGATIVE_SENTIMENT_THRESHOLD {
            insights.push(format!("Negative sentiment of {:.0}% exceeds the {:.0}% threshold.", negative_ratio * 100.0, NEGATIVE_SENTIMENT_THRESHOLD * 100.0));
            if let Some(ticket_id) = response.get("most_negative_ticket_id").and_then(Value::as_str) {
                recommendations.push(AgentRecommendation::mutating(
                    "escalate_ticket",
                    json!({"ticket_id": ticket_id}),
                    format!("Negative sentiment at {:.0}% is above threshold; escalating the most severe ticket", negative_ratio * 100.0),
                ));
            }
        }

        AgentResult::success(findings, insights).with_recommendations(recommendations)
    }

    async fn run_ticket_trends(&self, task: &AgentTask) -> AgentResult {
        let window_days = task.parameters.get("window_days").and_then(Value::as_i64).unwrap_or(7);

        let result = self.tools.invoke("get_ticket_trends", json!({"window_days": window_days})).await;

        let response = match result {
            Ok(v) => v,
            Err(e) => return AgentResult::Failure { error: e.to_string() },
        };

        let categories = response.get("categories").and_then(Value::as_array).cloned().unwrap_or_default();
        let mut findings = BTreeMap::new();
        findings.insert("ticket_categories".to_string(), Value::Array(categories.clone()));

        let mut insights = Vec::new();
        if categories.is_empty() {
            insights.push(format!("No ticket data for the last {window_days} days."));
        } else {
            insights.push(format!("Top issue categories over the last {window_days} days:"));
            for category in &categories {
                let name = category.get("name").and_then(Value::as_str).unwrap_or("unknown");
                let count = category.get("count").and_then(Value::as_i64).unwrap_or(0);
                let change_pct = category.get("change_pct").and_then(Value::as_f64).unwrap_or(0.0);
                insights.push(format!("  {name}: {count} tickets ({change_pct:+.0}% vs previous period)"));
            }
        }

        AgentResult::success(findings, insights)
    }
}
