//! Campaign spend and return-on-ad-spend analysis.

use crate::agents::matches_any;
use crate::domain::models::{AgentCapability, AgentMetadata, AgentRecommendation, AgentResult, AgentTask};
use crate::domain::ports::tool_transport::ToolTransport;
use crate::domain::ports::{Agent, AgentContext};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

const CANNOT_HANDLE_PATTERNS: &[&str] = &[
    "underperform",
    "zero conversion",
    "no conversions",
    "compare",
    "versus",
    " vs ",
    "period over period",
    "rank",
    "worst campaign",
    "best campaign",
];

const MIN_ACCEPTABLE_ROAS: f64 = 1.5;

pub struct MarketingAgent {
    tools: Arc<dyn ToolTransport>,
}

impl MarketingAgent {
    pub fn new(tools: Arc<dyn ToolTransport>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Agent for MarketingAgent {
    fn get_metadata(&self) -> AgentMetadata {
        AgentMetadata {
            name: "marketing",
            display_name: "MARKETING",
            description: "Reviews ad campaign spend and return on ad spend (ROAS).",
            capabilities: vec![
                AgentCapability {
                    name: "campaign_spend",
                    description: "Report spend and performance for a campaign",
                    parameters: &["campaign_id"],
                    example_queries: ["How is the summer sale campaign doing?", "What's the spend on campaign 42?"],
                },
                AgentCapability {
                    name: "calculate_roas",
                    description: "Calculate return on ad spend for a single campaign",
                    parameters: &["campaign_id"],
                    example_queries: ["What's the ROAS on campaign 42?", "Is the summer sale campaign profitable?"],
                },
            ],
            keywords: vec!["campaign", "ad", "marketing", "roas", "spend", "budget"],
            priority_boost_phrases: vec!["overspend", "urgent"],
        }
    }

    async fn run(&self, task: &AgentTask, _context: &AgentContext<'_>) -> AgentResult {
        if matches_any(task.query().unwrap_or_default(), CANNOT_HANDLE_PATTERNS) {
            let reason = "query requires cross-campaign ranking, zero-conversion analysis, or period comparison outside the marketing agent's core capabilities".to_string();
            return AgentResult::CannotHandle {
                insights: vec![reason.clone()],
                reason,
                suggested_agent: Some("data_analyst".to_string()),
            };
        }

        match task.mode() {
            Some("calculate_roas") => self.run_calculate_roas(task).await,
            _ => self.run_campaign_spend(task).await,
        }
    }
}

impl MarketingAgent {
    async fn run_campaign_spend(&self, task: &AgentTask) -> AgentResult {
        let campaign_id = task.parameters.get("campaign_id").and_then(Value::as_str).unwrap_or("");

        let result = self.tools.invoke("get_campaign_spend", json!({"campaign_id": campaign_id})).await;

        let response = match result {
            Ok(v) => v,
            Err(e) => return AgentResult::Failure { error: e.to_string() },
        };

        let spend = response.get("spend").and_then(Value::as_f64).unwrap_or(0.0);
        let revenue = response.get("revenue").and_then(Value::as_f64).unwrap_or(0.0);
        let roas = if spend > 0.0 { revenue / spend } else { 0.0 };

        let mut findings = BTreeMap::new();
        findings.insert("campaign".to_string(), response.clone());
        findings.insert("roas".to_string(), json!(roas));

        let mut insights = vec![format!("Campaign {campaign_id}: spend ${spend:.2}, revenue ${revenue:.2}, ROAS {roas:.2}x")];
        let mut recommendations = Vec::new();

        if roas < MIN_ACCEPTABLE_ROAS {
            insights.push(format!("ROAS of {roas:.2}x is below the minimum acceptable {MIN_ACCEPTABLE_ROAS:.1}x."));
            recommendations.push(AgentRecommendation::mutating(
                "pause_campaign",
                json!({"campaign_id": campaign_id}),
                format!("Campaign {campaign_id} is returning {roas:.2}x, below the {MIN_ACCEPTABLE_ROAS:.1}x minimum"),
            ));
        }

        AgentResult::success(findings, insights).with_recommendations(recommendations)
    }

    async fn run_calculate_roas(&self, task: &AgentTask) -> AgentResult {
        let campaign_id = task.parameters.get("campaign_id").and_then(Value::as_str).unwrap_or("");

        let result = self.tools.invoke("calculate_roas", json!({"campaign_id": campaign_id})).await;

        let response = match result {
            Ok(v) => v,
            Err(e) => return AgentResult::Failure { error: e.to_string() },
        };

        let roas = response.get("roas").and_then(Value::as_f64).unwrap_or(0.0);
        let mut findings = BTreeMap::new();
        findings.insert("roas".to_string(), response.clone());

        let mut insights = vec![format!("Campaign {campaign_id}: ROAS {roas:.2}x")];
        let mut recommendations = Vec::new();

        if roas < MIN_ACCEPTABLE_ROAS {
            insights.push(format!("ROAS of {roas:.2}x is below the minimum acceptable {MIN_ACCEPTABLE_ROAS:.1}x."));
            recommendations.push(AgentRecommendation::mutating(
                "pause_campaign",
                json!({"campaign_id": campaign_id}),
                format!("Campaign {campaign_id} is returning {roas:.2}x, below the {MIN_ACCEPTABLE_ROAS:.1}x minimum"),
            ));
        }

        AgentResult::success(findings, insights).with_recommendations(recommendations)
    }
}
