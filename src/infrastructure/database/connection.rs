use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

/// `SQLite` connection pool manager.
///
/// WAL mode, foreign keys, and a busy timeout for lock contention between
/// the HTTP handlers and the engine's own checkpoint/pending-action writes.
pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    /// * `database_url` - e.g. `sqlite://opsbrain.db` or `sqlite::memory:`
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("invalid database URL")?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(10)
            .idle_timeout(Duration::from_secs(30))
            .max_lifetime(Duration::from_secs(1800))
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .context("failed to create connection pool")?;

        Ok(Self { pool })
    }

    /// Applies all pending migrations from `migrations/`. Safe to call
    /// multiple times.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await.context("failed to run migrations")?;
        Ok(())
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connection_pool_creation() {
        let db = DatabaseConnection::new("sqlite::memory:").await.expect("failed to create database connection");
        assert!(!db.pool().is_closed());
        db.close().await;
    }

    #[tokio::test]
    async fn migration_runs_successfully() {
        let db = DatabaseConnection::new("sqlite::memory:").await.expect("failed to create database connection");
        db.migrate().await.expect("failed to run migrations");

        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='pending_actions'")
            .fetch_one(db.pool())
            .await
            .expect("failed to query table");
        assert_eq!(result.0, 1, "pending_actions table should exist");

        db.close().await;
    }
}
