//! Per-run engine state, checkpointable between the HITL pause and resume.

use super::agent_task::{AgentRecommendation, AgentTask};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The synthesizer's user-visible conclusion for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisSummary {
    pub narrative: String,
    #[serde(default)]
    pub key_findings: Vec<String>,
    pub confidence: f64,
}

/// An agent's proposed mutation, attached to the run before it is persisted
/// as a `PendingAction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingActionProposal {
    pub agent_name: String,
    pub action_type: String,
    pub payload: Value,
    pub reasoning: String,
    #[serde(default = "requires_approval_default")]
    pub requires_approval: bool,
}

fn requires_approval_default() -> bool {
    true
}

impl From<(&str, AgentRecommendation)> for PendingActionProposal {
    fn from((agent, rec): (&str, AgentRecommendation)) -> Self {
        Self {
            agent_name: agent.to_string(),
            action_type: rec.action_type,
            payload: rec.payload,
            reasoning: rec.reasoning,
            requires_approval: rec.requires_approval,
        }
    }
}

/// Why an agent could not be handled and who might pick it up instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannotHandleEntry {
    pub agent: String,
    pub query: String,
    pub reason: String,
}

/// A recommendation folded into state, still carrying which agent proposed
/// it — needed to attribute the `PendingAction` row it may become.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedRecommendation {
    pub agent: String,
    pub recommendation: AgentRecommendation,
}

/// The full, checkpointable snapshot of one orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphState {
    pub user_query: String,
    #[serde(default)]
    pub conversation_history: Vec<Value>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,

    #[serde(default)]
    pub battle_plan: Vec<AgentTask>,
    #[serde(default)]
    pub agent_findings: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    pub agent_insights: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub recommendations: Vec<TaggedRecommendation>,
    #[serde(default)]
    pub cannot_handle_agents: Vec<CannotHandleEntry>,
    #[serde(default)]
    pub memory_context: Vec<Value>,

    pub diagnosis: Option<DiagnosisSummary>,
    #[serde(default)]
    pub pending_action_proposals: Vec<PendingActionProposal>,
    #[serde(default)]
    pub system_warnings: Vec<String>,
    #[serde(default)]
    pub hitl_wait: bool,

    pub thread_id: String,

    #[serde(default)]
    pub replan_count: u32,
    #[serde(default = "default_max_replans")]
    pub max_replans: u32,
    #[serde(default)]
    pub needs_replan: bool,
    pub replan_reason: Option<String>,
    #[serde(default)]
    pub route_to_analyst: bool,

    #[serde(default)]
    pub hitl_pending_ids: Vec<i64>,
    #[serde(default)]
    pub hitl_approved_ids: Vec<i64>,
    #[serde(default)]
    pub hitl_rejected_ids: Vec<i64>,
    #[serde(default)]
    pub hitl_resumed: bool,

    pub final_answer: Option<String>,
    #[serde(default)]
    pub diagnostics: Vec<String>,
}

fn default_max_replans() -> u32 {
    2
}

impl GraphState {
    pub fn new(thread_id: impl Into<String>, user_query: impl Into<String>) -> Self {
        Self {
            user_query: user_query.into(),
            conversation_history: Vec::new(),
            metadata: BTreeMap::new(),
            battle_plan: Vec::new(),
            agent_findings: BTreeMap::new(),
            agent_insights: BTreeMap::new(),
            recommendations: Vec::new(),
            cannot_handle_agents: Vec::new(),
            memory_context: Vec::new(),
            diagnosis: None,
            pending_action_proposals: Vec::new(),
            system_warnings: Vec::new(),
            hitl_wait: false,
            thread_id: thread_id.into(),
            replan_count: 0,
            max_replans: default_max_replans(),
            needs_replan: false,
            replan_reason: None,
            route_to_analyst: false,
            hitl_pending_ids: Vec::new(),
            hitl_approved_ids: Vec::new(),
            hitl_rejected_ids: Vec::new(),
            hitl_resumed: false,
            final_answer: None,
            diagnostics: Vec::new(),
        }
    }

    /// Invariant S1: `replan_count` never exceeds `max_replans`.
    pub fn can_replan(&self) -> bool {
        self.replan_count < self.max_replans
    }

    pub fn agent_ran(&self, agent: &str) -> bool {
        self.agent_findings.contains_key(agent) || self.agent_insights.contains_key(agent)
    }

    pub fn agent_cannot_handled(&self, agent: &str) -> bool {
        self.cannot_handle_agents.iter().any(|e| e.agent == agent)
    }
}
