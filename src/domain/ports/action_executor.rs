//! Translates an approved `PendingAction` into a concrete tool invocation.

use crate::domain::errors::ExecutionError;
use crate::domain::models::PendingAction;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, action: &PendingAction) -> Result<Value, ExecutionError>;
}
