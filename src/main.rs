//! opsbrain-engine HTTP server entry point.

use anyhow::Context;
use opsbrain_engine::agents::data_analyst::DataAnalystAgent;
use opsbrain_engine::agents::historian::HistorianAgent;
use opsbrain_engine::agents::inventory::InventoryAgent;
use opsbrain_engine::agents::marketing::MarketingAgent;
use opsbrain_engine::agents::sales::SalesAgent;
use opsbrain_engine::agents::support::SupportAgent;
use opsbrain_engine::agents::AgentRegistry;
use opsbrain_engine::api::{build_router, AppState};
use opsbrain_engine::domain::ports::{Agent, CheckpointStore, LlmClient, PendingActionStore, ToolTransport};
use opsbrain_engine::infrastructure::database::{CheckpointRepositoryImpl, DatabaseConnection, PendingActionRepositoryImpl};
use opsbrain_engine::infrastructure::http::{HttpLlmClient, HttpToolTransport};
use opsbrain_engine::infrastructure::logging::{LogConfig, LoggerImpl};
use opsbrain_engine::services::{Engine, ToolTransportActionExecutor};
use opsbrain_engine::ConfigLoader;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;

    let _logger = LoggerImpl::init(&LogConfig::from(&config)).context("failed to initialize logging")?;

    info!(app_env = %config.app_env, "opsbrain-engine starting up");

    let db = DatabaseConnection::new(&config.pending_action_db.url).await.context("failed to connect to pending-action database")?;
    db.migrate().await.context("failed to run database migrations")?;

    let pending_actions: Arc<dyn PendingActionStore> = Arc::new(PendingActionRepositoryImpl::new(db.pool().clone()));
    let checkpoints: Arc<dyn CheckpointStore> = Arc::new(CheckpointRepositoryImpl::new(db.pool().clone()));

    let tools: Arc<dyn ToolTransport> = Arc::new(
        HttpToolTransport::new(
            config.tool_transport.endpoint.clone(),
            config.tool_transport.api_key.clone(),
            config.tool_transport.timeout_secs,
        )
        .context("failed to build tool transport client")?,
    );
    let llm: Arc<dyn LlmClient> = Arc::new(
        HttpLlmClient::new(
            config.llm.endpoint.clone(),
            config.llm.api_key.clone(),
            config.llm.deployment.clone(),
            config.llm.api_version.clone(),
            config.llm.temperature,
        )
        .context("failed to build LLM client")?,
    );

    let agents: Vec<Arc<dyn Agent>> = vec![
        Arc::new(SalesAgent::new(tools.clone())),
        Arc::new(InventoryAgent::new(tools.clone())),
        Arc::new(MarketingAgent::new(tools.clone())),
        Arc::new(SupportAgent::new(tools.clone())),
        Arc::new(DataAnalystAgent::new(llm.clone())),
        Arc::new(HistorianAgent::new(tools.clone())),
    ];
    let registry = Arc::new(AgentRegistry::new(agents));

    let engine = Arc::new(Engine::new(registry, llm, tools.clone(), pending_actions.clone(), checkpoints.clone(), 8));

    let executor = Arc::new(ToolTransportActionExecutor::new(tools.clone()));

    let state = Arc::new(AppState {
        engine,
        pending_actions,
        checkpoints,
        executor,
        tools,
    });

    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.http.bind_addr).await.context("failed to bind HTTP listener")?;
    info!(bind_addr = %config.http.bind_addr, "opsbrain-engine listening");

    axum::serve(listener, router).await.context("HTTP server error")?;

    Ok(())
}
