//! Appends a durable incident record after a completed run, so future plans
//! can surface it via the historian agent's similarity search.

use crate::domain::models::GraphState;
use crate::domain::ports::tool_transport::ToolTransport;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

const CONFIDENCE_THRESHOLD: f64 = 0.7;
const ROOT_CAUSE_MAX_LEN: usize = 500;

pub struct MemoryRecorder {
    tools: Arc<dyn ToolTransport>,
}

impl MemoryRecorder {
    pub fn new(tools: Arc<dyn ToolTransport>) -> Self {
        Self { tools }
    }

    /// Records the run's diagnosis as an incident, provided it was confident
    /// enough to be worth remembering. Never fails the run: any transport
    /// error becomes a warning on `state`.
    pub async fn record(&self, state: &mut GraphState) {
        let Some(diagnosis) = &state.diagnosis else {
            return;
        };
        if diagnosis.confidence <= CONFIDENCE_THRESHOLD {
            return;
        }

        let root_cause = truncate(&diagnosis.narrative, ROOT_CAUSE_MAX_LEN);
        let outcome = if state.pending_action_proposals.is_empty() { "analysis_shared" } else { "pending_approval" };

        let payload = json!({
            "summary": state.user_query,
            "root_cause": root_cause,
            "action_taken": null,
            "outcome": outcome,
        });

        if let Err(e) = self.tools.invoke("save_to_memory", payload).await {
            warn!(error = %e, "failed to save incident to memory, continuing without it");
            state.system_warnings.push(format!("memory_recording: {e}"));
        }
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        text.to_string()
    } else {
        let mut end = max_len;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text[..end].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundary() {
        let s = "a".repeat(510);
        assert_eq!(truncate(&s, 500).len(), 500);
    }

    #[test]
    fn leaves_short_text_untouched() {
        assert_eq!(truncate("short", 500), "short");
    }
}
