//! Pauses a run for human approval when agents propose mutations, and
//! resumes it once the operator has decided.

use crate::domain::errors::CheckpointError;
use crate::domain::models::{GraphState, PendingActionStatus};
use crate::domain::ports::{ActionExecutor, CheckpointStore, PendingActionStore};
use anyhow::{anyhow, Context};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct HitlGate {
    pending_actions: Arc<dyn PendingActionStore>,
    checkpoints: Arc<dyn CheckpointStore>,
    executor: Arc<dyn ActionExecutor>,
}

#[derive(Debug)]
pub struct ResumeOutcome {
    pub executed: Vec<i64>,
    pub execution_failures: Vec<(i64, String)>,
}

impl HitlGate {
    pub fn new(pending_actions: Arc<dyn PendingActionStore>, checkpoints: Arc<dyn CheckpointStore>, executor: Arc<dyn ActionExecutor>) -> Self {
        Self { pending_actions, checkpoints, executor }
    }

    /// First pass over a freshly-synthesized run. Persists proposals (if
    /// any), checkpoints, and sets `state.hitl_wait` accordingly.
    pub async fn gate(&self, state: &mut GraphState) -> Result<(), CheckpointError> {
        if state.pending_action_proposals.is_empty() {
            state.hitl_wait = false;
            return Ok(());
        }

        let rows = state
            .pending_action_proposals
            .iter()
            .map(|p| {
                let status = if p.requires_approval { PendingActionStatus::Pending } else { PendingActionStatus::Approved };
                (p.agent_name.clone(), p.action_type.clone(), p.payload.clone(), p.reasoning.clone(), status)
            })
            .collect();

        let ids = self
            .pending_actions
            .create_many(rows)
            .await
            .map_err(|e| CheckpointError::Store(e.to_string()))?;

        state.hitl_pending_ids = ids;
        state.hitl_wait = true;
        self.checkpoints.put(&state.thread_id, state).await?;
        info!(thread_id = %state.thread_id, count = state.hitl_pending_ids.len(), "run paused awaiting approval");
        Ok(())
    }

    /// Loads the checkpointed state for `thread_id` and executes the
    /// approved subset, per §4.8.
    pub async fn resume(
        &self,
        thread_id: &str,
        approved_action_ids: &[i64],
        rejected_action_ids: &[i64],
    ) -> Result<(GraphState, ResumeOutcome), CheckpointError> {
        let mut state = self
            .checkpoints
            .get(thread_id)
            .await?
            .ok_or_else(|| CheckpointError::NotFound(thread_id.to_string()))?;

        let mut executed = Vec::new();
        let mut execution_failures = Vec::new();

        for &id in approved_action_ids {
            match self.execute_one(id).await {
                Ok(()) => executed.push(id),
                Err(e) => {
                    warn!(action_id = id, error = %e, "approved action failed to execute");
                    execution_failures.push((id, e.to_string()));
                }
            }
        }

        state.hitl_pending_ids.clear();
        state.hitl_approved_ids.clear();
        state.hitl_rejected_ids.clear();
        state.hitl_resumed = true;
        state.hitl_wait = false;

        let _ = rejected_action_ids;
        Ok((state, ResumeOutcome { executed, execution_failures }))
    }

    async fn execute_one(&self, id: i64) -> anyhow::Result<()> {
        let action = self
            .pending_actions
            .get(id)
            .await
            .context("loading pending action")?
            .ok_or_else(|| anyhow!("pending action {id} not found"))?;

        if action.status != PendingActionStatus::Approved {
            return Err(anyhow!("pending action {id} is in status '{}', not 'approved'", action.status.as_str()));
        }

        match self.executor.execute(&action).await {
            Ok(result) => {
                self.pending_actions
                    .transition(id, PendingActionStatus::Executed)
                    .await
                    .context("transitioning action to executed")?;
                info!(action_id = id, result = %result_summary(&result), "action executed");
                Ok(())
            }
            Err(e) => {
                error!(action_id = id, error = %e, "action executor failed; status left unchanged");
                Err(anyhow!(e))
            }
        }
    }
}

fn result_summary(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
