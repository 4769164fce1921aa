//! Axum handlers: translate HTTP requests into engine/store calls and back
//! into the DTOs in [`super::dto`].

use super::dto::{
    ApproveActionRequest, ApproveActionResponse, ApprovalDecision, ErrorResponse, ExecutionResponse,
    IncidentsListQuery, IncidentsListResponse, IncidentsSearchQuery, PendingActionResponse,
    PendingActionsListResponse, QueryRequest, QueryResponse, ResumeRequest,
};
use crate::domain::errors::{ApprovalError, CheckpointError};
use crate::domain::models::PendingActionStatus;
use crate::domain::ports::{ActionExecutor, CheckpointStore, PendingActionStore, StoreError, ToolTransport};
use crate::services::Engine;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

pub struct AppState {
    pub engine: Arc<Engine>,
    pub pending_actions: Arc<dyn PendingActionStore>,
    pub checkpoints: Arc<dyn CheckpointStore>,
    pub executor: Arc<dyn ActionExecutor>,
    pub tools: Arc<dyn ToolTransport>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { detail: detail.into() }))
}

fn checkpoint_error_response(e: CheckpointError) -> ApiError {
    match e {
        CheckpointError::NotFound(thread_id) => error_response(StatusCode::NOT_FOUND, format!("unknown thread '{thread_id}'")),
        other => {
            error!(error = %other, "checkpoint store error");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

pub async fn submit_query(State(state): State<Arc<AppState>>, Json(body): Json<QueryRequest>) -> Result<Json<QueryResponse>, ApiError> {
    let thread_id = Uuid::new_v4().to_string();

    let mut conversation_history = Vec::new();
    if let Some(meta) = &body.metadata {
        conversation_history.push(json!({"user_id": body.user_id, "metadata": meta}));
    }

    let result_state = state.engine.run(&thread_id, &body.question, conversation_history).await.map_err(checkpoint_error_response)?;

    let pending = state.pending_actions.list_by_status(PendingActionStatus::Pending).await.map_err(|e| {
        error!(error = %e, "failed to list pending actions after run");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to load pending actions")
    })?;
    let pending: Vec<_> = pending.into_iter().filter(|p| result_state.hitl_pending_ids.contains(&p.id)).collect();

    Ok(Json(QueryResponse::from_state(result_state, pending)))
}

pub async fn resume_query(State(state): State<Arc<AppState>>, Json(body): Json<ResumeRequest>) -> Result<Json<QueryResponse>, ApiError> {
    let (result_state, outcome) = state
        .engine
        .resume(&body.thread_id, &body.approved_action_ids, &body.rejected_action_ids)
        .await
        .map_err(checkpoint_error_response)?;

    for (id, message) in &outcome.execution_failures {
        warn!(action_id = id, error = %message, "action failed during resume");
    }

    Ok(Json(QueryResponse::from_state(result_state, Vec::new())))
}

pub async fn list_pending_actions(State(state): State<Arc<AppState>>) -> Result<Json<PendingActionsListResponse>, ApiError> {
    let items = state.pending_actions.list_pending().await.map_err(|e| {
        error!(error = %e, "failed to list pending actions");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to load pending actions")
    })?;

    Ok(Json(PendingActionsListResponse {
        items: items.into_iter().map(PendingActionResponse::from).collect(),
    }))
}

pub async fn approve_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<ApproveActionRequest>,
) -> Result<Json<ApproveActionResponse>, ApiError> {
    let target = match body.status {
        ApprovalDecision::Approved => PendingActionStatus::Approved,
        ApprovalDecision::Rejected => PendingActionStatus::Rejected,
    };

    let action = state.pending_actions.transition(id, target).await.map_err(approval_error_response)?;

    if !(body.execute_immediately && body.status == ApprovalDecision::Approved) {
        return Ok(Json(ApproveActionResponse { action: action.into(), execution: None }));
    }

    let execution = execute_action(&state, &action.id).await?;
    Ok(Json(ApproveActionResponse { action: execution.0.into(), execution: Some(execution.1) }))
}

pub async fn execute_action(
    state: &Arc<AppState>,
    id: &i64,
) -> Result<(crate::domain::models::PendingAction, ExecutionResponse), ApiError> {
    let action = state
        .pending_actions
        .get(*id)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to load pending action");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to load pending action")
        })?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("pending action {id} not found")))?;

    match state.executor.execute(&action).await {
        Ok(result) => {
            let action = state.pending_actions.transition(*id, PendingActionStatus::Executed).await.map_err(approval_error_response)?;
            Ok((action, ExecutionResponse { success: true, message: "executed".to_string(), result: Some(result) }))
        }
        Err(e) => {
            warn!(action_id = id, error = %e, "action execution failed");
            Ok((action, ExecutionResponse { success: false, message: e.to_string(), result: e.response }))
        }
    }
}

pub async fn execute_action_endpoint(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Result<Json<ApproveActionResponse>, ApiError> {
    let (action, execution) = execute_action(&state, &id).await?;
    Ok(Json(ApproveActionResponse { action: action.into(), execution: Some(execution) }))
}

fn approval_error_response(e: StoreError) -> ApiError {
    match e {
        StoreError::Approval(ApprovalError::NotFound(id)) => error_response(StatusCode::NOT_FOUND, format!("pending action {id} not found")),
        StoreError::Approval(ApprovalError::InvalidTransition { id, status, target }) => error_response(
            StatusCode::CONFLICT,
            format!("pending action {id} is in status '{status}' and cannot transition to '{target}'"),
        ),
        StoreError::Database(e) => {
            error!(error = %e, "pending action store error");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "pending action store error")
        }
    }
}

pub async fn list_incidents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IncidentsListQuery>,
) -> Result<Json<IncidentsListResponse>, ApiError> {
    let response = state
        .tools
        .invoke("list_incidents", json!({"limit": params.limit, "offset": params.offset}))
        .await
        .map_err(|e| {
            error!(error = %e, "list_incidents tool call failed");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    let items = response.get("items").and_then(serde_json::Value::as_array).cloned().unwrap_or_default();
    Ok(Json(IncidentsListResponse { items }))
}

pub async fn search_incidents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IncidentsSearchQuery>,
) -> Result<Json<IncidentsListResponse>, ApiError> {
    let response = state
        .tools
        .invoke("query_vector_memory", json!({"text": params.query, "k": params.k}))
        .await
        .map_err(|e| {
            error!(error = %e, "query_vector_memory tool call failed");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    let items = response.get("matches").and_then(serde_json::Value::as_array).cloned().unwrap_or_default();
    Ok(Json(IncidentsListResponse { items }))
}
