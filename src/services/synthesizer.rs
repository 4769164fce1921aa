//! Turns evaluated state into a final diagnosis and the set of pending
//! action proposals a human will need to approve.

use crate::domain::models::{DiagnosisSummary, GraphState, PendingActionProposal};
use crate::domain::ports::llm_client::LlmClient;
use std::sync::Arc;
use tracing::warn;

const SYNTHESIS_SYSTEM_PROMPT: &str = "\
You are an operations analyst for an e-commerce back office. Given the findings and insights \
gathered by several specialist agents, write a clear, specific narrative answer to the user's \
question. Where the data suggests a cause, state it as an explicit causal hypothesis. Avoid \
vague hedging; be concrete about numbers and trends you were given.";

pub struct Synthesizer {
    llm: Arc<dyn LlmClient>,
}

impl Synthesizer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn synthesize(&self, state: &mut GraphState) {
        let context = build_context(state);

        let narrative = match self.llm.complete(SYNTHESIS_SYSTEM_PROMPT, &context).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "synthesis LLM call failed, falling back to a deterministic summary");
                deterministic_summary(state)
            }
        };

        let key_findings: Vec<String> = state.agent_insights.values().flatten().cloned().collect();
        let confidence = (0.5 + 0.1 * key_findings.len() as f64).min(0.95);

        state.diagnosis = Some(DiagnosisSummary {
            narrative,
            key_findings,
            confidence,
        });

        state.pending_action_proposals = state
            .recommendations
            .iter()
            .filter(|tagged| tagged.recommendation.requires_approval)
            .map(|tagged| PendingActionProposal::from((tagged.agent.as_str(), tagged.recommendation.clone())))
            .collect();

        state.hitl_wait = !state.pending_action_proposals.is_empty();
    }
}

fn build_context(state: &GraphState) -> String {
    let mut out = format!("User question: {}\n\n", state.user_query);

    for (agent, findings) in &state.agent_findings {
        out.push_str(&format!("## {agent} findings\n{}\n", serde_json::to_string_pretty(findings).unwrap_or_default()));
    }
    for (agent, insights) in &state.agent_insights {
        out.push_str(&format!("## {agent} insights\n"));
        for insight in insights {
            out.push_str(&format!("- {insight}\n"));
        }
    }
    if !state.memory_context.is_empty() {
        out.push_str("## Similar past incidents\n");
        for hit in &state.memory_context {
            out.push_str(&format!("- {hit}\n"));
        }
    }
    if !state.system_warnings.is_empty() {
        out.push_str("## Warnings\n");
        for warning in &state.system_warnings {
            out.push_str(&format!("- {warning}\n"));
        }
    }
    out
}

fn deterministic_summary(state: &GraphState) -> String {
    let mut lines = Vec::new();
    for (agent, insights) in &state.agent_insights {
        for insight in insights {
            lines.push(format!("[{agent}] {insight}"));
        }
    }
    for warning in &state.system_warnings {
        lines.push(format!("[warning] {warning}"));
    }
    if lines.is_empty() {
        "No findings were available to summarize.".to_string()
    } else {
        lines.join("\n")
    }
}
