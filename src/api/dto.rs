//! Request/response bodies for the HTTP surface. Kept distinct from the
//! domain models so the wire shape can evolve independently of them.

use crate::domain::models::{GraphState, PendingAction};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ResumeRequest {
    pub thread_id: String,
    #[serde(default)]
    pub approved_action_ids: Vec<i64>,
    #[serde(default)]
    pub rejected_action_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct PendingActionResponse {
    pub id: i64,
    pub agent: String,
    pub action_type: String,
    pub payload: Value,
    pub reasoning: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PendingAction> for PendingActionResponse {
    fn from(a: PendingAction) -> Self {
        Self {
            id: a.id,
            agent: a.agent,
            action_type: a.action_type,
            payload: a.payload,
            reasoning: a.reasoning,
            status: a.status.as_str().to_string(),
            created_at: a.created_at.to_rfc3339(),
            updated_at: a.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub diagnostics: Vec<String>,
    pub pending_actions: Vec<PendingActionResponse>,
    pub thread_id: String,
    pub hitl_waiting: bool,
}

impl QueryResponse {
    pub fn from_state(state: GraphState, pending_actions: Vec<PendingAction>) -> Self {
        Self {
            answer: state.final_answer.unwrap_or_default(),
            diagnostics: state.diagnostics,
            pending_actions: pending_actions.into_iter().map(PendingActionResponse::from).collect(),
            thread_id: state.thread_id,
            hitl_waiting: state.hitl_wait,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PendingActionsListResponse {
    pub items: Vec<PendingActionResponse>,
}

#[derive(Debug, Deserialize)]
pub struct ApproveActionRequest {
    pub status: ApprovalDecision,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub execute_immediately: bool,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

#[derive(Debug, Serialize)]
pub struct ApproveActionResponse {
    pub action: PendingActionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionResponse>,
}

#[derive(Debug, Serialize)]
pub struct ExecutionResponse {
    pub success: bool,
    pub message: String,
    pub result: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct IncidentsListResponse {
    pub items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct IncidentsListQuery {
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct IncidentsSearchQuery {
    pub query: String,
    #[serde(default = "default_search_k")]
    pub k: i64,
}

fn default_search_k() -> i64 {
    5
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}
