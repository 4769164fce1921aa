//! Revenue and top-product analysis. Delegates period comparisons and
//! cross-cuts (region/channel/contribution) to the data analyst.

use crate::agents::matches_any;
use crate::domain::models::{AgentCapability, AgentMetadata, AgentRecommendation, AgentResult, AgentTask};
use crate::domain::ports::tool_transport::ToolTransport;
use crate::domain::ports::{Agent, AgentContext};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

const CANNOT_HANDLE_PATTERNS: &[&str] = &[
    "compare",
    "versus",
    " vs ",
    "compared to",
    "period over period",
    "region",
    "channel",
    "contribution",
];

pub struct SalesAgent {
    tools: Arc<dyn ToolTransport>,
}

impl SalesAgent {
    pub fn new(tools: Arc<dyn ToolTransport>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Agent for SalesAgent {
    fn get_metadata(&self) -> AgentMetadata {
        AgentMetadata {
            name: "sales",
            display_name: "SALES",
            description: "Analyzes revenue, sales performance, and top-selling products.",
            capabilities: vec![
                AgentCapability {
                    name: "summary",
                    description: "Summarize revenue for a recent window",
                    parameters: &["window_days"],
                    example_queries: ["How are sales trending this week?", "Why did sales drop yesterday?"],
                },
                AgentCapability {
                    name: "top_products",
                    description: "Find best-selling products by revenue",
                    parameters: &["window_days", "limit"],
                    example_queries: ["What are the top 5 selling products?", "Best sellers last week"],
                },
            ],
            keywords: vec!["sale", "revenue", "trend", "income", "top", "best", "product"],
            priority_boost_phrases: vec!["revenue", "sales drop", "urgent"],
        }
    }

    async fn run(&self, task: &AgentTask, _context: &AgentContext<'_>) -> AgentResult {
        if matches_any(task.query().unwrap_or_default(), CANNOT_HANDLE_PATTERNS) {
            let reason = "query requires period comparison or cross-dimensional analysis outside the sales agent's core capabilities".to_string();
            return AgentResult::CannotHandle {
                insights: vec![reason.clone()],
                reason,
                suggested_agent: Some("data_analyst".to_string()),
            };
        }

        match task.mode() {
            Some("top_products") => self.run_top_products(task).await,
            _ => self.run_summary(task).await,
        }
    }
}

impl SalesAgent {
    async fn run_top_products(&self, task: &AgentTask) -> AgentResult {
        let window_days = task.parameters.get("window_days").and_then(Value::as_i64).unwrap_or(7);
        let limit = task.parameters.get("limit").and_then(Value::as_i64).unwrap_or(5);

        let result = self
            .tools
            .invoke("get_top_products", json!({"window_days": window_days, "limit": limit}))
            .await;

        let response = match result {
            Ok(v) => v,
            Err(e) => return AgentResult::Failure { error: e.to_string() },
        };

        let products = response.get("products").and_then(Value::as_array).cloned().unwrap_or_default();
        let mut findings = BTreeMap::new();
        findings.insert("top_products".to_string(), Value::Array(products.clone()));
        findings.insert("window_days".to_string(), json!(window_days));

        let mut insights = Vec::new();
        if products.is_empty() {
            insights.push(format!("No product sales data found for the last {window_days} days."));
        } else {
            insights.push(format!("Top {} selling products in the last {window_days} days:", products.len()));
            for (i, product) in products.iter().enumerate() {
                let name = product.get("name").and_then(Value::as_str).unwrap_or("unknown");
                let revenue = product.get("revenue").and_then(Value::as_f64).unwrap_or(0.0);
                insights.push(format!("  {}. {name} - ${revenue:.2} revenue", i + 1));
            }
        }

        AgentResult::success(findings, insights)
    }

    async fn run_summary(&self, task: &AgentTask) -> AgentResult {
        let window_days = task.parameters.get("window_days").and_then(Value::as_i64).unwrap_or(7);

        let result = self
            .tools
            .invoke("get_sales_summary", json!({"window_days": window_days}))
            .await;

        let response = match result {
            Ok(v) => v,
            Err(e) => return AgentResult::Failure { error: e.to_string() },
        };

        let revenue = response.get("total_revenue").and_then(Value::as_f64).unwrap_or(0.0);
        let change_pct = response.get("revenue_change_pct").and_then(Value::as_f64).unwrap_or(0.0);

        let mut findings = BTreeMap::new();
        findings.insert("summary".to_string(), response.clone());

        let mut insights = vec![format!("Revenue over the last {window_days} days: ${revenue:.2} ({change_pct:+.1}% vs previous period)")];
        let mut recommendations = Vec::new();

        if change_pct < -10.0 {
            insights.push(format!("Significant revenue drop of {change_pct:.1}% detected."));
            recommendations.push(AgentRecommendation::read_only(
                "investigate_revenue_drop",
                json!({"drop_percentage": change_pct}),
                format!("Revenue dropped {change_pct:.1}% which exceeds the 10% threshold"),
            ));
        }

        AgentResult::success(findings, insights).with_recommendations(recommendations)
    }
}
