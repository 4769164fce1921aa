//! The stateless RPC client every agent uses to reach external tools.

use crate::domain::errors::{ToolInvocationError, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolTransportError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Invocation(#[from] ToolInvocationError),
}

/// `POST /invoke {tool, arguments}`, authenticated by bearer token.
///
/// One pooled, thread-safe client is shared by every agent within a run.
/// Per spec, tool invocations are not automatically retried at this layer.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    async fn invoke(&self, tool: &str, arguments: Value) -> Result<Value, ToolTransportError>;
}
