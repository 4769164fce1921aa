//! HTTP-surface integration tests, driving the router in-process via
//! `tower::ServiceExt::oneshot` — no socket bound, no network access.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{FailingLlmClient, FakeToolTransport};
use http_body_util::BodyExt;
use opsbrain_engine::agents::data_analyst::DataAnalystAgent;
use opsbrain_engine::agents::historian::HistorianAgent;
use opsbrain_engine::agents::inventory::InventoryAgent;
use opsbrain_engine::agents::marketing::MarketingAgent;
use opsbrain_engine::agents::sales::SalesAgent;
use opsbrain_engine::agents::support::SupportAgent;
use opsbrain_engine::agents::AgentRegistry;
use opsbrain_engine::api::{build_router, AppState};
use opsbrain_engine::domain::ports::{Agent, CheckpointStore, LlmClient, PendingActionStore, ToolTransport};
use opsbrain_engine::infrastructure::database::{CheckpointRepositoryImpl, PendingActionRepositoryImpl};
use opsbrain_engine::services::{Engine, ToolTransportActionExecutor};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower::ServiceExt;

async fn test_state(tools: Arc<dyn ToolTransport>, llm: Arc<dyn LlmClient>) -> Arc<AppState> {
    let pool = SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let pending_actions: Arc<dyn PendingActionStore> = Arc::new(PendingActionRepositoryImpl::new(pool.clone()));
    let checkpoints: Arc<dyn CheckpointStore> = Arc::new(CheckpointRepositoryImpl::new(pool));

    let agents: Vec<Arc<dyn Agent>> = vec![
        Arc::new(SalesAgent::new(tools.clone())),
        Arc::new(InventoryAgent::new(tools.clone())),
        Arc::new(MarketingAgent::new(tools.clone())),
        Arc::new(SupportAgent::new(tools.clone())),
        Arc::new(DataAnalystAgent::new(llm.clone())),
        Arc::new(HistorianAgent::new(tools.clone())),
    ];
    let registry = Arc::new(AgentRegistry::new(agents));

    let engine = Arc::new(Engine::new(registry, llm, tools.clone(), pending_actions.clone(), checkpoints.clone(), 4));
    let executor = Arc::new(ToolTransportActionExecutor::new(tools.clone()));

    Arc::new(AppState { engine, pending_actions, checkpoints, executor, tools })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn post_query_returns_an_answer_and_a_thread_id() {
    let tools: Arc<dyn ToolTransport> =
        Arc::new(FakeToolTransport::new().with_response("get_top_products", json!({"products": [{"name": "Widget", "revenue": 10.0}]})));
    let llm: Arc<dyn LlmClient> = Arc::new(FailingLlmClient);
    let state = test_state(tools, llm).await;
    let app = build_router(state);

    let body = json!({"question": "What are the top 5 selling products?"}).to_string();
    let request = Request::builder().method("POST").uri("/query").header("content-type", "application/json").body(Body::from(body)).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let payload = body_json(response).await;
    assert!(payload["thread_id"].as_str().is_some());
    assert!(payload["answer"].as_str().unwrap().contains("Widget"));
    assert_eq!(payload["hitl_waiting"], json!(false));
}

#[tokio::test]
async fn resume_with_unknown_thread_returns_404() {
    let tools: Arc<dyn ToolTransport> = Arc::new(FakeToolTransport::new());
    let llm: Arc<dyn LlmClient> = Arc::new(FailingLlmClient);
    let state = test_state(tools, llm).await;
    let app = build_router(state);

    let body = json!({"thread_id": "nope", "approved_action_ids": [], "rejected_action_ids": []}).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/query/resume")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pending_action_lifecycle_through_the_http_surface() {
    let tools: Arc<dyn ToolTransport> = Arc::new(
        FakeToolTransport::new()
            .with_response("get_inventory_status", json!({"quantity": 1}))
            .with_response("update_inventory", json!({"updated": true})),
    );
    let llm: Arc<dyn LlmClient> = Arc::new(FailingLlmClient);
    let state = test_state(tools, llm).await;
    let app = build_router(state);

    let query_body = json!({"question": "Any products low on stock?"}).to_string();
    let request = Request::builder().method("POST").uri("/query").header("content-type", "application/json").body(Body::from(query_body)).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["hitl_waiting"], json!(true));
    let action_id = payload["pending_actions"][0]["id"].as_i64().unwrap();

    let request = Request::builder().method("GET").uri("/actions/pending").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);

    let approve_body = json!({"status": "approved", "execute_immediately": true}).to_string();
    let request = Request::builder()
        .method("POST")
        .uri(format!("/actions/approve/{action_id}"))
        .header("content-type", "application/json")
        .body(Body::from(approve_body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let approved = body_json(response).await;
    assert_eq!(approved["action"]["status"], json!("executed"));
    assert_eq!(approved["execution"]["success"], json!(true));
}
