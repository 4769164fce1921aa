//! The chat-completion endpoint used by the planner and synthesizer.

use crate::domain::errors::TransportError;
use async_trait::async_trait;

/// A single `{system, user}` chat-completion round-trip. No function-calling
/// assumed — the caller parses whatever text comes back.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, TransportError>;
}
