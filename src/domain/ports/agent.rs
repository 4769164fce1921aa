//! The capability set every agent value implements: metadata plus a single
//! `run` entry point. No class hierarchy — the registry is a map from name
//! to a boxed trait object.

use crate::domain::models::{AgentMetadata, AgentResult, AgentTask};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// What an agent can see about the run so far: the user's query, the tail
/// of the conversation, memory hits surfaced by the historian, and a
/// snapshot of what other agents have already produced.
pub struct AgentContext<'a> {
    pub user_query: &'a str,
    pub conversation_history: &'a [Value],
    pub memory_context: &'a [Value],
    pub prior_findings: &'a BTreeMap<String, BTreeMap<String, Value>>,
}

#[async_trait]
pub trait Agent: Send + Sync {
    fn get_metadata(&self) -> AgentMetadata;

    async fn run(&self, task: &AgentTask, context: &AgentContext<'_>) -> AgentResult;
}
