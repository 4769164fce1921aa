//! Composes the next battle plan after the evaluator asks for another pass.

use crate::agents::AgentRegistry;
use crate::domain::models::{AgentTask, GraphState};
use crate::domain::ports::llm_client::LlmClient;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub struct Replanner {
    llm: Arc<dyn LlmClient>,
}

impl Replanner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Increments `state.replan_count` and produces the next battle plan.
    pub async fn replan(&self, state: &mut GraphState, registry: &AgentRegistry, reason: &str, route_to_analyst: bool) {
        state.replan_count += 1;
        state.needs_replan = false;
        state.replan_reason = Some(reason.to_string());

        if route_to_analyst {
            state.route_to_analyst = false;
            state.battle_plan = vec![AgentTask::new("data_analyst", "Generate custom SQL to answer the question", 1)
                .with_parameter("mode", Value::String("analyze".to_string()))
                .with_parameter("query", Value::String(state.user_query.clone()))];
            return;
        }

        match self.replan_with_llm(state, registry).await {
            Some(tasks) if !tasks.is_empty() => state.battle_plan = tasks,
            _ => {
                warn!("replanner LLM produced nothing usable, falling back to a last-resort data_analyst task");
                if registry.contains("data_analyst") {
                    state.battle_plan = vec![AgentTask::new("data_analyst", "Generate custom SQL as a last resort", 1)
                        .with_parameter("mode", Value::String("analyze".to_string()))
                        .with_parameter("query", Value::String(state.user_query.clone()))];
                } else {
                    state.battle_plan = Vec::new();
                }
            }
        }
    }

    async fn replan_with_llm(&self, state: &GraphState, registry: &AgentRegistry) -> Option<Vec<AgentTask>> {
        let already_tried: Vec<&str> = state.agent_findings.keys().map(String::as_str).collect();
        let failed: Vec<&str> = state
            .system_warnings
            .iter()
            .filter_map(|w| w.split(':').next())
            .collect();

        let mut system = String::from(
            "You are re-planning a multi-agent query after a first pass produced insufficient results. \
             Favor agents that have not yet been tried, and favor the data_analyst as a fallback for \
             anything cross-cutting. Reply with a JSON array of {agent, objective, parameters, priority}, \
             no prose, no code fences.\n\n",
        );
        for (_, agent) in registry.iter() {
            system.push_str(&agent.get_metadata().render_section());
        }

        let user = format!(
            "User question: {}\nAlready tried (with findings): {}\nFailed agents: {}\nReplan reason: {}",
            state.user_query,
            already_tried.join(", "),
            failed.join(", "),
            state.replan_reason.as_deref().unwrap_or("unspecified"),
        );

        let response = self.llm.complete(&system, &user).await.ok()?;
        let json_text = response.trim().trim_start_matches("```json").trim_start_matches("```").trim_end_matches("```").trim();
        let raw: Vec<Value> = serde_json::from_str(json_text).ok()?;

        let tasks: Vec<AgentTask> = raw
            .into_iter()
            .filter_map(|entry| {
                let agent = entry.get("agent")?.as_str()?.to_string();
                if !registry.contains(&agent) || state.agent_ran(&agent) {
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
                task = task.with_parameter("query", Value::String(state.user_query.clone()));
                Some(task)
            })
            .collect();

        Some(tasks)
    }
}
