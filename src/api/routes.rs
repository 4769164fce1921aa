//! Builds the `axum` router: one route per endpoint in the external
//! interface, `tower-http` tracing layered over the whole surface.

use super::handlers::{
    approve_action, execute_action_endpoint, list_incidents, list_pending_actions, resume_query, search_incidents, submit_query, AppState,
};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/query", post(submit_query))
        .route("/query/resume", post(resume_query))
        .route("/actions/pending", get(list_pending_actions))
        .route("/actions/approve/{id}", post(approve_action))
        .route("/actions/execute/{id}", post(execute_action_endpoint))
        .route("/history/incidents", get(list_incidents))
        .route("/history/incidents/search", get(search_incidents))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
