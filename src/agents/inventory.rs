//! Stock levels and restock recommendations.

use crate::agents::matches_any;
use crate::domain::models::{AgentCapability, AgentMetadata, AgentRecommendation, AgentResult, AgentTask};
use crate::domain::ports::tool_transport::ToolTransport;
use crate::domain::ports::{Agent, AgentContext};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

const CANNOT_HANDLE_PATTERNS: &[&str] = &[
    "predict",
    "when run out",
    "when will we run out",
    "top seller",
    "best seller",
    "trend",
    "velocity",
];

const LOW_STOCK_THRESHOLD: i64 = 10;
const URGENT_STOCK_THRESHOLD: i64 = 3;

pub struct InventoryAgent {
    tools: Arc<dyn ToolTransport>,
}

impl InventoryAgent {
    pub fn new(tools: Arc<dyn ToolTransport>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Agent for InventoryAgent {
    fn get_metadata(&self) -> AgentMetadata {
        AgentMetadata {
            name: "inventory",
            display_name: "INVENTORY",
            description: "Checks stock levels and flags items that need restocking.",
            capabilities: vec![
                AgentCapability {
                    name: "check_stock",
                    description: "Look up current stock for a named item",
                    parameters: &["item_name"],
                    example_queries: ["How much stock do we have of blue widgets?", "Check inventory for SKU 1042"],
                },
                AgentCapability {
                    name: "low_stock_scan",
                    description: "Scan all items for low or out-of-stock conditions",
                    parameters: &["threshold"],
                    example_queries: ["What items are about to run out?", "Any products low on stock?"],
                },
            ],
            keywords: vec!["stock", "inventory", "restock", "out of stock", "low stock"],
            priority_boost_phrases: vec!["out of stock", "run out", "urgent"],
        }
    }

    async fn run(&self, task: &AgentTask, _context: &AgentContext<'_>) -> AgentResult {
        if matches_any(task.query().unwrap_or_default(), CANNOT_HANDLE_PATTERNS) {
            let reason = "query requires predictive forecasting, top-seller cross-analysis, or trend/velocity analysis outside the inventory agent's core capabilities".to_string();
            return AgentResult::CannotHandle {
                insights: vec![reason.clone()],
                reason,
                suggested_agent: Some("data_analyst".to_string()),
            };
        }

        match task.mode() {
            Some("check_stock") => self.run_check_stock(task).await,
            _ => self.run_low_stock_scan(task).await,
        }
    }
}

impl InventoryAgent {
    async fn run_check_stock(&self, task: &AgentTask) -> AgentResult {
        let item_name = task.parameters.get("item_name").and_then(Value::as_str).unwrap_or("");

        let result = self.tools.invoke("get_inventory_status", json!({"item_name": item_name})).await;

        let response = match result {
            Ok(v) => v,
            Err(e) => return AgentResult::Failure { error: e.to_string() },
        };

        let quantity = response.get("quantity").and_then(Value::as_i64).unwrap_or(0);
        let mut findings = BTreeMap::new();
        findings.insert("stock".to_string(), response.clone());

        let mut insights = vec![format!("{item_name} has {quantity} units in stock.")];
        let mut recommendations = Vec::new();

        if quantity <= URGENT_STOCK_THRESHOLD {
            insights.push(format!("{item_name} is critically low ({quantity} units)."));
            recommendations.push(AgentRecommendation::mutating(
                "urgent_restock",
                json!({"item_name": item_name, "quantity_change": LOW_STOCK_THRESHOLD * 2 - quantity}),
                format!("{item_name} has only {quantity} units left, below the urgent threshold of {URGENT_STOCK_THRESHOLD}"),
            ));
        } else if quantity <= LOW_STOCK_THRESHOLD {
            insights.push(format!("{item_name} is running low ({quantity} units)."));
            recommendations.push(AgentRecommendation::mutating(
                "restock_item",
                json!({"item_name": item_name, "quantity_change": LOW_STOCK_THRESHOLD * 2 - quantity}),
                format!("{item_name} has {quantity} units left, below the low-stock threshold of {LOW_STOCK_THRESHOLD}"),
            ));
        }

        AgentResult::success(findings, insights).with_recommendations(recommendations)
    }

    async fn run_low_stock_scan(&self, task: &AgentTask) -> AgentResult {
        let threshold = task.parameters.get("threshold").and_then(Value::as_i64).unwrap_or(LOW_STOCK_THRESHOLD);

        let result = self.tools.invoke("get_low_stock_products", json!({"threshold": threshold})).await;

        let response = match result {
            Ok(v) => v,
            Err(e) => return AgentResult::Failure { error: e.to_string() },
        };

        let items = response.get("items").and_then(Value::as_array).cloned().unwrap_or_default();
        let mut findings = BTreeMap::new();
        findings.insert("low_stock_items".to_string(), Value::Array(items.clone()));

        let mut insights = Vec::new();
        let mut recommendations = Vec::new();

        if items.is_empty() {
            insights.push(format!("No items below the {threshold}-unit threshold."));
        } else {
            insights.push(format!("{} item(s) below the {threshold}-unit threshold:", items.len()));
            for item in &items {
                let name = item.get("name").and_then(Value::as_str).unwrap_or("unknown");
                let quantity = item.get("quantity").and_then(Value::as_i64).unwrap_or(0);
                insights.push(format!("  {name}: {quantity} units"));

                if quantity <= URGENT_STOCK_THRESHOLD {
                    recommendations.push(AgentRecommendation::mutating(
                        "urgent_restock",
                        json!({"item_name": name, "quantity_change": threshold * 2 - quantity}),
                        format!("{name} has only {quantity} units left, below the urgent threshold"),
                    ));
                }
            }
        }

        AgentResult::success(findings, insights).with_recommendations(recommendations)
    }
}
