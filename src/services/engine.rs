//! The single orchestration entry point: wires planning, dispatch,
//! evaluation, re-planning, synthesis, the HITL gate, and memory recording
//! into one run.

use crate::agents::AgentRegistry;
use crate::domain::errors::CheckpointError;
use crate::domain::models::GraphState;
use crate::services::action_executor::ToolTransportActionExecutor;
use crate::services::dispatcher::Dispatcher;
use crate::services::evaluator::{Evaluator, EvaluatorDecision};
use crate::services::hitl::{HitlGate, ResumeOutcome};
use crate::services::memory_recording::MemoryRecorder;
use crate::services::planner::Planner;
use crate::services::replanner::Replanner;
use crate::services::synthesizer::Synthesizer;

use crate::domain::ports::{CheckpointStore, LlmClient, PendingActionStore, ToolTransport};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub struct Engine {
    registry: Arc<AgentRegistry>,
    planner: Planner,
    dispatcher: Dispatcher,
    replanner: Replanner,
    synthesizer: Synthesizer,
    hitl: HitlGate,
    memory: MemoryRecorder,
}

impl Engine {
    pub fn new(
        registry: Arc<AgentRegistry>,
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolTransport>,
        pending_actions: Arc<dyn PendingActionStore>,
        checkpoints: Arc<dyn CheckpointStore>,
        max_concurrency: usize,
    ) -> Self {
        let executor = Arc::new(ToolTransportActionExecutor::new(tools.clone()));
        Self {
            dispatcher: Dispatcher::new(registry.clone(), max_concurrency),
            planner: Planner::new(llm.clone()),
            replanner: Replanner::new(llm.clone()),
            synthesizer: Synthesizer::new(llm),
            hitl: HitlGate::new(pending_actions, checkpoints, executor),
            memory: MemoryRecorder::new(tools),
            registry,
        }
    }

    /// Runs a query from scratch: plan, dispatch/evaluate/replan until
    /// settled, synthesize, gate on HITL, and record memory if the run
    /// didn't pause. Returns the final state, checkpointed if it paused.
    pub async fn run(&self, thread_id: &str, user_query: &str, conversation_history: Vec<Value>) -> Result<GraphState, CheckpointError> {
        let mut state = GraphState::new(thread_id, user_query);
        state.conversation_history = conversation_history;

        state.battle_plan = self.planner.plan(&self.registry, &state.user_query, &state.conversation_history).await;
        info!(thread_id, agents = ?state.battle_plan.iter().map(|t| t.agent.as_str()).collect::<Vec<_>>(), "battle plan composed");

        loop {
            let failed_agents = self.dispatcher.dispatch(&mut state).await;

            match Evaluator::evaluate(&state, &failed_agents) {
                EvaluatorDecision::Synthesize => break,
                EvaluatorDecision::Replan { reason, route_to_analyst } => {
                    if !state.can_replan() {
                        break;
                    }
                    info!(thread_id, reason = %reason, route_to_analyst, "replanning");
                    self.replanner.replan(&mut state, &self.registry, &reason, route_to_analyst).await;
                }
            }
        }

        self.synthesizer.synthesize(&mut state).await;
        self.hitl.gate(&mut state).await?;
        populate_diagnostics(&mut state);

        if !state.hitl_wait {
            self.memory.record(&mut state).await;
        }

        Ok(state)
    }

    /// Resumes a paused run: executes approved actions, then records memory
    /// for the completed run exactly as a non-paused `run` would.
    pub async fn resume(
        &self,
        thread_id: &str,
        approved_action_ids: &[i64],
        rejected_action_ids: &[i64],
    ) -> Result<(GraphState, ResumeOutcome), CheckpointError> {
        let (mut state, outcome) = self.hitl.resume(thread_id, approved_action_ids, rejected_action_ids).await?;
        populate_diagnostics(&mut state);
        self.memory.record(&mut state).await;
        Ok((state, outcome))
    }
}

/// Lists which agents ran, whether HITL is pending, and how many warnings
/// occurred, so even a non-fatal but degraded run is legible to the caller.
fn populate_diagnostics(state: &mut GraphState) {
    let mut agents_ran: Vec<&str> = state.agent_findings.keys().map(String::as_str).collect();
    agents_ran.extend(state.agent_insights.keys().map(String::as_str).filter(|a| !agents_ran.contains(a)));
    agents_ran.sort_unstable();
    agents_ran.dedup();

    state.diagnostics.push(format!("agents ran: {}", agents_ran.join(", ")));
    state.diagnostics.push(format!("hitl pending: {}", state.hitl_wait));
    state.diagnostics.push(format!("warnings: {}", state.system_warnings.len()));
}
