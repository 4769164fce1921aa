//! Episodic memory: durable incident records and similarity-ranked hits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only record of a past run's outcome, queried for context on plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryIncident {
    pub id: Option<i64>,
    pub summary: String,
    pub root_cause: Option<String>,
    pub action_taken: Option<String>,
    pub outcome: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl MemoryIncident {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            id: None,
            summary: summary.into(),
            root_cause: None,
            action_taken: None,
            outcome: None,
            created_at: None,
        }
    }
}

/// A similarity-ranked hit returned from `query_similar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryHit {
    pub id: i64,
    pub summary: String,
    pub root_cause: Option<String>,
    pub score: f64,
}
