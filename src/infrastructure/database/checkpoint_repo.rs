//! `SQLite` implementation of `CheckpointStore`: one row per thread, whole
//! `GraphState` serialized as JSON, upserted on every `put`.

use crate::domain::errors::CheckpointError;
use crate::domain::models::GraphState;
use crate::domain::ports::checkpoint_store::CheckpointStore;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

pub struct CheckpointRepositoryImpl {
    pool: SqlitePool,
}

impl CheckpointRepositoryImpl {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckpointStore for CheckpointRepositoryImpl {
    async fn put(&self, thread_id: &str, state: &GraphState) -> Result<(), CheckpointError> {
        let state_json = serde_json::to_string(state).map_err(|e| CheckpointError::Store(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO checkpoints (thread_id, state, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(thread_id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
        )
        .bind(thread_id)
        .bind(state_json)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| CheckpointError::Store(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, thread_id: &str) -> Result<Option<GraphState>, CheckpointError> {
        let row = sqlx::query("SELECT state FROM checkpoints WHERE thread_id = ?")
            .bind(thread_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CheckpointError::Store(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let state_json: String = row.get("state");
        let state = serde_json::from_str(&state_json).map_err(|e| CheckpointError::Corrupt(thread_id.to_string(), e.to_string()))?;
        Ok(Some(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> CheckpointRepositoryImpl {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        CheckpointRepositoryImpl::new(pool)
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let repo = setup().await;
        let state = GraphState::new("t1", "why did sales drop");
        repo.put("t1", &state).await.unwrap();
        let loaded = repo.get("t1").await.unwrap().unwrap();
        assert_eq!(loaded.user_query, "why did sales drop");
    }

    #[tokio::test]
    async fn get_missing_thread_returns_none() {
        let repo = setup().await;
        assert!(repo.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_overwrites_existing_checkpoint() {
        let repo = setup().await;
        let mut state = GraphState::new("t1", "q1");
        repo.put("t1", &state).await.unwrap();
        state.user_query = "q2".to_string();
        repo.put("t1", &state).await.unwrap();
        let loaded = repo.get("t1").await.unwrap().unwrap();
        assert_eq!(loaded.user_query, "q2");
    }
}
