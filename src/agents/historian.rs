//! Episodic memory access: similarity search on plan, past-outcome lookup,
//! and incident recording on commit. Pure memory access — no cannot_handle.

use crate::domain::models::{AgentCapability, AgentMetadata, AgentResult, AgentTask};
use crate::domain::ports::tool_transport::ToolTransport;
use crate::domain::ports::{Agent, AgentContext};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_K: i64 = 5;

pub struct HistorianAgent {
    tools: Arc<dyn ToolTransport>,
}

impl HistorianAgent {
    pub fn new(tools: Arc<dyn ToolTransport>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Agent for HistorianAgent {
    fn get_metadata(&self) -> AgentMetadata {
        AgentMetadata {
            name: "historian",
            display_name: "HISTORIAN",
            description: "Recalls similar past incidents and records new ones once a diagnosis lands.",
            capabilities: vec![
                AgentCapability {
                    name: "query",
                    description: "Find past incidents similar to the current question",
                    parameters: &["query", "k"],
                    example_queries: ["Why did sales drop yesterday?", "Has this happened before?"],
                },
                AgentCapability {
                    name: "past_actions",
                    description: "Extract prior actions and outcomes from matching incidents",
                    parameters: &["query"],
                    example_queries: ["What did we do last time stock ran low?", "How did we fix the last ROAS dip?"],
                },
            ],
            keywords: vec!["why", "reason", "cause", "explain", "happened", "before", "history"],
            priority_boost_phrases: vec![],
        }
    }

    async fn run(&self, task: &AgentTask, context: &AgentContext<'_>) -> AgentResult {
        match task.mode() {
            Some("past_actions") => self.run_past_actions(task, context).await,
            Some("save") => self.run_save(task).await,
            _ => self.run_query(task, context).await,
        }
    }
}

impl HistorianAgent {
    async fn run_query(&self, task: &AgentTask, context: &AgentContext<'_>) -> AgentResult {
        let query = task.query().unwrap_or(context.user_query);
        let k = task.parameters.get("k").and_then(Value::as_i64).unwrap_or(DEFAULT_K);

        let result = self.tools.invoke("query_vector_memory", json!({"text": query, "k": k})).await;
        let response = match result {
            Ok(v) => v,
            Err(e) => return AgentResult::Failure { error: e.to_string() },
        };

        let matches = response.get("matches").and_then(Value::as_array).cloned().unwrap_or_default();
        let mut findings = BTreeMap::new();
        findings.insert("matches".to_string(), Value::Array(matches.clone()));

        let mut insights = Vec::new();
        if matches.is_empty() {
            insights.push("No similar past incidents found.".to_string());
        } else {
            insights.push(format!("Found {} similar past incident(s):", matches.len()));
            for hit in &matches {
                let summary = hit.get("summary").and_then(Value::as_str).unwrap_or("unknown");
                let score = hit.get("score").and_then(Value::as_f64).unwrap_or(0.0);
                insights.push(format!("  \"{summary}\" (similarity {score:.2})"));
            }
        }

        AgentResult::success(findings, insights)
    }

    async fn run_past_actions(&self, task: &AgentTask, context: &AgentContext<'_>) -> AgentResult {
        let query = task.query().unwrap_or(context.user_query);

        let result = self.tools.invoke("query_vector_memory", json!({"text": query, "k": DEFAULT_K})).await;
        let response = match result {
            Ok(v) => v,
            Err(e) => return AgentResult::Failure { error: e.to_string() },
        };

        let matches = response.get("matches").and_then(Value::as_array).cloned().unwrap_or_default();
        let actions: Vec<Value> = matches
            .iter()
            .filter_map(|m| {
                let action_taken = m.get("action_taken")?.as_str()?;
                Some(json!({"action_taken": action_taken, "outcome": m.get("outcome")}))
            })
            .collect();

        let mut findings = BTreeMap::new();
        findings.insert("past_actions".to_string(), Value::Array(actions.clone()));

        let insights = if actions.is_empty() {
            vec!["No recorded actions from similar past incidents.".to_string()]
        } else {
            vec![format!("{} past action(s) found from similar incidents.", actions.len())]
        };

        AgentResult::success(findings, insights)
    }

    async fn run_save(&self, task: &AgentTask) -> AgentResult {
        let summary = task.parameters.get("summary").and_then(Value::as_str).unwrap_or("").to_string();
        let root_cause = task.parameters.get("root_cause").cloned().unwrap_or(Value::Null);
        let outcome = task.parameters.get("outcome").cloned().unwrap_or(Value::Null);

        let result = self
            .tools
            .invoke("save_to_memory", json!({"summary": summary, "root_cause": root_cause, "outcome": outcome}))
            .await;

        let response = match result {
            Ok(v) => v,
            Err(e) => return AgentResult::Failure { error: e.to_string() },
        };

        let id = response.get("id").cloned().unwrap_or(Value::Null);
        let mut findings = BTreeMap::new();
        findings.insert("saved_id".to_string(), id);

        AgentResult::success(findings, vec!["Incident recorded to memory.".to_string()])
    }
}
