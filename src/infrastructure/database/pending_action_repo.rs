//! `SQLite` implementation of `PendingActionStore`, with row-locked status
//! transitions enforcing invariants I1-I3.

use crate::domain::errors::ApprovalError;
use crate::domain::models::{PendingAction, PendingActionStatus};
use crate::domain::ports::pending_action_store::{PendingActionStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Row, SqlitePool};

pub struct PendingActionRepositoryImpl {
    pool: SqlitePool,
}

impl PendingActionRepositoryImpl {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_action(row: &sqlx::sqlite::SqliteRow) -> Result<PendingAction, sqlx::Error> {
    let status_str: String = row.get("status");
    let payload_str: String = row.get("payload");
    Ok(PendingAction {
        id: row.get("id"),
        agent: row.get("agent"),
        action_type: row.get("action_type"),
        payload: serde_json::from_str(&payload_str).unwrap_or(Value::Null),
        reasoning: row.get("reasoning"),
        status: PendingActionStatus::parse(&status_str).unwrap_or(PendingActionStatus::Pending),
        created_at: row.get::<String, _>("created_at").parse().unwrap_or_else(|_| Utc::now()),
        updated_at: row.get::<String, _>("updated_at").parse().unwrap_or_else(|_| Utc::now()),
    })
}

#[async_trait]
impl PendingActionStore for PendingActionRepositoryImpl {
    async fn create_many(&self, rows: Vec<(String, String, Value, String, PendingActionStatus)>) -> Result<Vec<i64>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(rows.len());
        let now = Utc::now().to_rfc3339();

        for (agent, action_type, payload, reasoning, status) in rows {
            let payload_str = serde_json::to_string(&payload).unwrap_or_else(|_| "null".to_string());
            let result = sqlx::query(
                "INSERT INTO pending_actions (agent, action_type, payload, reasoning, status, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(agent)
            .bind(action_type)
            .bind(payload_str)
            .bind(reasoning)
            .bind(status.as_str())
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
            ids.push(result.last_insert_rowid());
        }

        tx.commit().await?;
        Ok(ids)
    }

    async fn get(&self, id: i64) -> Result<Option<PendingAction>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM pending_actions WHERE id = ?").bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_action).transpose()
    }

    async fn list_pending(&self) -> Result<Vec<PendingAction>, sqlx::Error> {
        self.list_by_status(PendingActionStatus::Pending).await
    }

    async fn list_by_status(&self, status: PendingActionStatus) -> Result<Vec<PendingAction>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM pending_actions WHERE status = ? ORDER BY created_at ASC")
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_action).collect()
    }

    async fn transition(&self, id: i64, target: PendingActionStatus) -> Result<PendingAction, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM pending_actions WHERE id = ?").bind(id).fetch_optional(&mut *tx).await?;
        let Some(row) = row else {
            tx.rollback().await?;
            return Err(ApprovalError::NotFound(id).into());
        };
        let current = row_to_action(&row)?;

        if !current.status.can_transition_to(target) {
            tx.rollback().await?;
            return Err(ApprovalError::InvalidTransition {
                id,
                status: current.status.as_str().to_string(),
                target: target.as_str().to_string(),
            }
            .into());
        }

        let now = Utc::now().to_rfc3339();
        let update_result = sqlx::query("UPDATE pending_actions SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
            .bind(target.as_str())
            .bind(&now)
            .bind(id)
            .bind(current.status.as_str())
            .execute(&mut *tx)
            .await?;

        if update_result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(ApprovalError::InvalidTransition {
                id,
                status: current.status.as_str().to_string(),
                target: target.as_str().to_string(),
            }
            .into());
        }

        tx.commit().await?;
        Ok(PendingAction { status: target, updated_at: now.parse().unwrap_or_else(|_| Utc::now()), ..current })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn setup() -> PendingActionRepositoryImpl {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        PendingActionRepositoryImpl::new(pool)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = setup().await;
        let ids = repo
            .create_many(vec![("inventory".to_string(), "restock_item".to_string(), json!({"quantity": 5}), "low stock".to_string(), PendingActionStatus::Pending)])
            .await
            .unwrap();
        let action = repo.get(ids[0]).await.unwrap().unwrap();
        assert_eq!(action.agent, "inventory");
        assert_eq!(action.status, PendingActionStatus::Pending);
    }

    #[tokio::test]
    async fn transition_rejects_invalid_jump() {
        let repo = setup().await;
        let ids = repo
            .create_many(vec![("inventory".to_string(), "restock_item".to_string(), json!({}), "r".to_string(), PendingActionStatus::Pending)])
            .await
            .unwrap();
        let result = repo.transition(ids[0], PendingActionStatus::Executed).await;
        assert!(matches!(result, Err(StoreError::Approval(ApprovalError::InvalidTransition { .. }))));
    }

    #[tokio::test]
    async fn approved_can_transition_to_executed() {
        let repo = setup().await;
        let ids = repo
            .create_many(vec![("inventory".to_string(), "restock_item".to_string(), json!({}), "r".to_string(), PendingActionStatus::Approved)])
            .await
            .unwrap();
        let action = repo.transition(ids[0], PendingActionStatus::Executed).await.unwrap();
        assert_eq!(action.status, PendingActionStatus::Executed);
    }
}
