//! Atomic get/put keyed by `thread_id`, used to durably suspend a run at
//! the HITL gate and resume it later.

use crate::domain::errors::CheckpointError;
use crate::domain::models::GraphState;
use async_trait::async_trait;

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn put(&self, thread_id: &str, state: &GraphState) -> Result<(), CheckpointError>;

    async fn get(&self, thread_id: &str) -> Result<Option<GraphState>, CheckpointError>;
}
