//! Durable storage for `PendingAction` rows, with single-writer-per-row
//! transition semantics (invariants I1-I3).

use crate::domain::errors::ApprovalError;
use crate::domain::models::{PendingAction, PendingActionStatus};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait PendingActionStore: Send + Sync {
    /// Insert one row per proposal; returns the assigned ids in the same order.
    async fn create_many(
        &self,
        rows: Vec<(String, String, Value, String, PendingActionStatus)>,
    ) -> Result<Vec<i64>, sqlx::Error>;

    async fn get(&self, id: i64) -> Result<Option<PendingAction>, sqlx::Error>;

    async fn list_pending(&self) -> Result<Vec<PendingAction>, sqlx::Error>;

    async fn list_by_status(&self, status: PendingActionStatus) -> Result<Vec<PendingAction>, sqlx::Error>;

    /// Attempt a row-locked status transition, enforcing I1/I2. Returns the
    /// row's new state on success.
    async fn transition(
        &self,
        id: i64,
        target: PendingActionStatus,
    ) -> Result<PendingAction, StoreError>;
}
