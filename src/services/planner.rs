//! Turns a user question into an ordered battle plan, either by asking the
//! LLM to compose one against the registered agents' capabilities, or, when
//! that fails, by a deterministic keyword scan.

use crate::agents::AgentRegistry;
use crate::domain::errors::PlanningError;
use crate::domain::models::AgentTask;
use crate::domain::ports::llm_client::LlmClient;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

const PLANNER_SYSTEM_PREAMBLE: &str = "\
You are the task planner for a multi-agent operations back office. Given a user question, \
emit a JSON array of task objects, each shaped {\"agent\": string, \"objective\": string, \
\"parameters\": object, \"priority\": number}. Only use agents listed below. Agents follow a \
slimmed architecture: if a query needs cross-cutting or comparative analysis beyond an \
agent's stated capabilities, that agent will return cannot_handle and the query will be \
rerouted to the data analyst. Reply with the JSON array only, no prose, no code fences.\n\n";

pub struct Planner {
    llm: Arc<dyn LlmClient>,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn plan(
        &self,
        registry: &AgentRegistry,
        user_query: &str,
        conversation_history: &[Value],
    ) -> Vec<AgentTask> {
        match self.plan_with_llm(registry, user_query, conversation_history).await {
            Ok(tasks) if !tasks.is_empty() => tasks,
            Ok(_) => {
                warn!("planner LLM returned zero usable tasks, falling back to keyword planner");
                keyword_plan(registry, user_query)
            }
            Err(e) => {
                warn!(error = %e, "planner LLM call failed, falling back to keyword planner");
                keyword_plan(registry, user_query)
            }
        }
    }

    async fn plan_with_llm(
        &self,
        registry: &AgentRegistry,
        user_query: &str,
        conversation_history: &[Value],
    ) -> Result<Vec<AgentTask>, PlanningError> {
        let mut system = String::from(PLANNER_SYSTEM_PREAMBLE);
        for (_, agent) in registry.iter() {
            system.push_str(&agent.get_metadata().render_section());
        }

        let mut user = format!("User question: {user_query}\n");
        if !conversation_history.is_empty() {
            user.push_str("Recent conversation:\n");
            for turn in conversation_history.iter().rev().take(3).rev() {
                user.push_str(&format!("- {turn}\n"));
            }
        }

        let response = self
            .llm
            .complete(&system, &user)
            .await
            .map_err(|e| PlanningError(e.to_string()))?;

        let json_text = strip_code_fences(&response);
        let raw: Vec<Value> = serde_json::from_str(json_text)
            .map_err(|e| PlanningError(format!("could not parse plan JSON: {e}")))?;

        let mut tasks: Vec<AgentTask> = raw
            .into_iter()
            .filter_map(|entry| parse_raw_task(entry, registry, user_query))
            .collect();
        tasks.sort_by_key(|t| t.priority);
        Ok(tasks)
    }
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed)
        .strip_suffix("```")
        .unwrap_or(trimmed)
        .trim()
}

fn parse_raw_task(entry: Value, registry: &AgentRegistry, user_query: &str) -> Option<AgentTask> {
    let agent = entry.get("agent")?.as_str()?.to_string();
    if !registry.contains(&agent) {
        return None;
    }
    let objective = entry.get("objective").and_then(Value::as_str).unwrap_or("").to_string();
    let priority = entry.get("priority").and_then(Value::as_i64).unwrap_or(5) as i32;

    let mut task = AgentTask::new(agent, objective, priority);
    if let Some(params) = entry.get("parameters").and_then(Value::as_object) {
        for (k, v) in params {
            task = task.with_parameter(k.clone(), v.clone());
        }
    }
    task = task.with_parameter("query", Value::String(user_query.to_string()));
    Some(task)
}

/// Deterministic fallback used when the LLM is unavailable or returns
/// nothing usable. First match wins within a category; categories accumulate.
fn keyword_plan(registry: &AgentRegistry, user_query: &str) -> Vec<AgentTask> {
    let lowered = user_query.to_lowercase();
    let mut tasks = Vec::new();

    let wants_top_products = ["top", "best", "highest", "most sold"].iter().any(|k| lowered.contains(k))
        && ["product", "item", "sku", "selling"].iter().any(|k| lowered.contains(k));

    if wants_top_products && registry.contains("sales") {
        let limit = parse_top_n(&lowered).unwrap_or(5);
        tasks.push(
            AgentTask::new("sales", "Find top selling products", 1)
                .with_parameter("mode", Value::String("top_products".to_string()))
                .with_parameter("limit", Value::from(limit))
                .with_parameter("query", Value::String(user_query.to_string())),
        );
    } else if ["sale", "revenue", "trend", "income"].iter().any(|k| lowered.contains(k)) && registry.contains("sales") {
        tasks.push(
            AgentTask::new("sales", "Summarize sales", 1)
                .with_parameter("mode", Value::String("summary".to_string()))
                .with_parameter("query", Value::String(user_query.to_string())),
        );
    }

    if ["stock", "inventory", "restock"].iter().any(|k| lowered.contains(k)) && registry.contains("inventory") {
        tasks.push(
            AgentTask::new("inventory", "Check stock levels", 2)
                .with_parameter("mode", Value::String("check_stock".to_string()))
                .with_parameter("product_ids", Value::from(vec![1, 2, 3]))
                .with_parameter("query", Value::String(user_query.to_string())),
        );
    }

    if ["campaign", "ad", "roas", "spend"].iter().any(|k| lowered.contains(k)) && registry.contains("marketing") {
        tasks.push(
            AgentTask::new("marketing", "Review campaign spend", 2)
                .with_parameter("mode", Value::String("campaign_spend".to_string()))
                .with_parameter("query", Value::String(user_query.to_string())),
        );
    }

    if ["ticket", "support", "sentiment", "complaint"].iter().any(|k| lowered.contains(k)) && registry.contains("support") {
        tasks.push(
            AgentTask::new("support", "Analyze ticket sentiment", 2)
                .with_parameter("mode", Value::String("sentiment_analysis".to_string()))
                .with_parameter("query", Value::String(user_query.to_string())),
        );
    }

    if ["why", "reason", "cause", "explain", "happened"].iter().any(|k| lowered.contains(k)) && registry.contains("historian") {
        tasks.push(
            AgentTask::new("historian", "Search for similar past incidents", 3)
                .with_parameter("mode", Value::String("query".to_string()))
                .with_parameter("query", Value::String(user_query.to_string())),
        );
    }

    if tasks.is_empty() && registry.contains("sales") {
        tasks.push(
            AgentTask::new("sales", "Summarize sales", 1)
                .with_parameter("mode", Value::String("summary".to_string()))
                .with_parameter("query", Value::String(user_query.to_string())),
        );
    }

    tasks
}

fn parse_top_n(lowered: &str) -> Option<i64> {
    let idx = lowered.find("top")?;
    let rest = lowered[idx + 3..].trim_start();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_code_fence() {
        assert_eq!(strip_code_fences("```json\n[1,2]\n```"), "[1,2]");
    }

    #[test]
    fn parses_top_n_from_query() {
        assert_eq!(parse_top_n("what are the top 5 selling products"), Some(5));
        assert_eq!(parse_top_n("top selling products"), None);
    }
}
