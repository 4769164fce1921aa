//! Tasks planned for an agent to run, and the tagged results agents return.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One unit of work assigned to a named agent by the planner.
///
/// Immutable once planned. `parameters` always carries the original user
/// query (under `"query"`) so an agent can fall back to scanning it, and a
/// `"mode"` entry naming the capability to exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    pub agent: String,
    pub objective: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    /// 1 is highest priority.
    pub priority: i32,
    pub result_slot: String,
}

impl AgentTask {
    pub fn new(agent: impl Into<String>, objective: impl Into<String>, priority: i32) -> Self {
        let agent = agent.into();
        Self {
            result_slot: agent.clone(),
            agent,
            objective: objective.into(),
            parameters: BTreeMap::new(),
            priority,
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn mode(&self) -> Option<&str> {
        self.parameters.get("mode").and_then(Value::as_str)
    }

    pub fn query(&self) -> Option<&str> {
        self.parameters.get("query").and_then(Value::as_str)
    }
}

/// A proposed mutation an agent would like a human to approve.
///
/// `requires_approval = true` is the default; only read-only investigatory
/// actions may set it false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecommendation {
    pub action_type: String,
    pub payload: Value,
    pub reasoning: String,
    #[serde(default = "requires_approval_default")]
    pub requires_approval: bool,
}

fn requires_approval_default() -> bool {
    true
}

impl AgentRecommendation {
    pub fn mutating(action_type: impl Into<String>, payload: Value, reasoning: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload,
            reasoning: reasoning.into(),
            requires_approval: true,
        }
    }

    pub fn read_only(action_type: impl Into<String>, payload: Value, reasoning: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload,
            reasoning: reasoning.into(),
            requires_approval: false,
        }
    }
}

/// The tagged outcome of running an `AgentTask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentResult {
    Success {
        findings: BTreeMap<String, Value>,
        insights: Vec<String>,
        #[serde(default)]
        recommendations: Vec<AgentRecommendation>,
    },
    Failure {
        error: String,
    },
    NeedsRetry {
        error: String,
    },
    CannotHandle {
        reason: String,
        suggested_agent: Option<String>,
        #[serde(default)]
        insights: Vec<String>,
    },
}

impl AgentResult {
    pub fn success(findings: BTreeMap<String, Value>, insights: Vec<String>) -> Self {
        Self::Success {
            findings,
            insights,
            recommendations: Vec::new(),
        }
    }

    pub fn with_recommendations(mut self, recs: Vec<AgentRecommendation>) -> Self {
        if let Self::Success { recommendations, .. } = &mut self {
            *recommendations = recs;
        }
        self
    }

    pub fn cannot_handle(reason: impl Into<String>) -> Self {
        Self::CannotHandle {
            reason: reason.into(),
            suggested_agent: None,
            insights: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::NeedsRetry { .. })
    }
}
