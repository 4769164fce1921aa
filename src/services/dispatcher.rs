//! Runs a battle plan: every task dispatched concurrently, fan-out/fan-in,
//! bounded by a semaphore, each task retried up to twice on `needs_retry`.

use crate::agents::AgentRegistry;
use crate::domain::models::agent_task::AgentResult as TaskOutcome;
use crate::domain::models::{AgentTask, CannotHandleEntry, GraphState, TaggedRecommendation};
use crate::domain::ports::agent::AgentContext;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

const MAX_ATTEMPTS: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct Dispatcher {
    registry: Arc<AgentRegistry>,
    max_concurrency: usize,
}

impl Dispatcher {
    pub fn new(registry: Arc<AgentRegistry>, max_concurrency: usize) -> Self {
        Self { registry, max_concurrency }
    }

    /// Runs every task in `state.battle_plan`, folds the results back into
    /// `state` in place, and returns the names of agents whose task failed
    /// (terminal `failure`, including unknown-agent misses) for the evaluator.
    pub async fn dispatch(&self, state: &mut GraphState) -> Vec<String> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency.max(1)));
        let mut handles = Vec::with_capacity(state.battle_plan.len());

        let conversation_history = state.conversation_history.clone();
        let memory_context = state.memory_context.clone();
        let prior_findings = state.agent_findings.clone();
        let user_query = state.user_query.clone();

        for task in &state.battle_plan {
            let task = task.clone();
            let agent_name = task.agent.clone();
            let Some(agent) = self.registry.get(&task.agent).cloned() else {
                let handle = tokio::spawn(async move {
                    (task, TaskOutcome::Failure { error: format!("no registered agent named '{}'", task.agent) })
                });
                handles.push((agent_name, handle));
                continue;
            };

            let permit = semaphore.clone();
            let conversation_history = conversation_history.clone();
            let memory_context = memory_context.clone();
            let prior_findings = prior_findings.clone();
            let user_query = user_query.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit.acquire_owned().await.expect("semaphore never closed");
                let outcome = run_with_retry(agent.as_ref(), &task, &user_query, &conversation_history, &memory_context, &prior_findings).await;
                (task, outcome)
            });
            handles.push((agent_name, handle));
        }

        let mut failed_agents = Vec::new();
        for (agent_name, handle) in handles {
            match handle.await {
                Ok((task, outcome)) => {
                    if matches!(outcome, TaskOutcome::Failure { .. }) {
                        failed_agents.push(task.agent.clone());
                    }
                    fold_result(state, &task, outcome);
                }
                Err(e) => {
                    warn!(agent = %agent_name, error = %e, "dispatched agent task panicked");
                    state.system_warnings.push(format!("{agent_name}: task panicked: {e}"));
                    failed_agents.push(agent_name);
                }
            }
        }
        failed_agents
    }
}

async fn run_with_retry(
    agent: &(dyn crate::domain::ports::Agent),
    task: &AgentTask,
    user_query: &str,
    conversation_history: &[Value],
    memory_context: &[Value],
    prior_findings: &BTreeMap<String, BTreeMap<String, Value>>,
) -> TaskOutcome {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let context = AgentContext {
            user_query,
            conversation_history,
            memory_context,
            prior_findings,
        };
        let outcome = agent.run(task, &context).await;

        let should_retry = matches!(outcome, TaskOutcome::NeedsRetry { .. }) && attempt < MAX_ATTEMPTS;
        if !should_retry {
            return outcome;
        }
        warn!(agent = %task.agent, attempt, "agent task needs_retry, retrying");
        tokio::time::sleep(RETRY_DELAY).await;
    }
}

fn fold_result(state: &mut GraphState, task: &AgentTask, outcome: TaskOutcome) {
    match outcome {
        TaskOutcome::Success { findings, insights, recommendations } => {
            info!(agent = %task.agent, "agent task succeeded");
            if task.agent == "historian" {
                if let Some(matches) = findings.get("matches").and_then(Value::as_array) {
                    state.memory_context.extend(matches.iter().cloned());
                }
            }
            state.agent_findings.insert(task.agent.clone(), findings);
            state.agent_insights.insert(task.agent.clone(), insights);
            state.recommendations.extend(recommendations.into_iter().map(|recommendation| TaggedRecommendation {
                agent: task.agent.clone(),
                recommendation,
            }));
        }
        TaskOutcome::CannotHandle { reason, insights, .. } => {
            info!(agent = %task.agent, reason = %reason, "agent cannot handle task");
            state.agent_insights.insert(task.agent.clone(), insights);
            state.cannot_handle_agents.push(CannotHandleEntry {
                agent: task.agent.clone(),
                query: task.query().unwrap_or_default().to_string(),
                reason,
            });
        }
        TaskOutcome::Failure { error } | TaskOutcome::NeedsRetry { error } => {
            warn!(agent = %task.agent, error = %error, "agent task failed");
            state.system_warnings.push(format!("{}: {error}", task.agent));
        }
    }
}
