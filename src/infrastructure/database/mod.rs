//! Database infrastructure
//!
//! `SQLite` implementation using sqlx with:
//! - Repository pattern adapters for `PendingActionStore`/`CheckpointStore`
//! - Filesystem-based migrations (`migrations/`)
//! - Connection pool management with WAL mode

pub mod checkpoint_repo;
pub mod connection;
pub mod pending_action_repo;

pub use checkpoint_repo::CheckpointRepositoryImpl;
pub use connection::DatabaseConnection;
pub use pending_action_repo::PendingActionRepositoryImpl;
