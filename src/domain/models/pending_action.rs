//! Durable record of a proposed mutation awaiting (or past) human approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status lifecycle: `pending -> approved -> executed` or `pending -> rejected`.
///
/// `executed` and `rejected` are terminal (invariant I2). Only `approved` may
/// become `executed` (invariant I1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingActionStatus {
    Pending,
    Approved,
    Rejected,
    Executed,
}

impl PendingActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Executed => "executed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "executed" => Some(Self::Executed),
            _ => None,
        }
    }

    /// Whether moving from `self` to `target` is a legal transition (I1/I2).
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Executed)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: i64,
    pub agent: String,
    pub action_type: String,
    pub payload: Value,
    pub reasoning: String,
    pub status: PendingActionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_approved_can_become_executed() {
        assert!(PendingActionStatus::Approved.can_transition_to(PendingActionStatus::Executed));
        assert!(!PendingActionStatus::Pending.can_transition_to(PendingActionStatus::Executed));
    }

    #[test]
    fn terminal_states_accept_no_further_transitions() {
        for target in [
            PendingActionStatus::Pending,
            PendingActionStatus::Approved,
            PendingActionStatus::Rejected,
            PendingActionStatus::Executed,
        ] {
            assert!(!PendingActionStatus::Executed.can_transition_to(target));
            assert!(!PendingActionStatus::Rejected.can_transition_to(target));
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            PendingActionStatus::Pending,
            PendingActionStatus::Approved,
            PendingActionStatus::Rejected,
            PendingActionStatus::Executed,
        ] {
            assert_eq!(PendingActionStatus::parse(status.as_str()), Some(status));
        }
    }
}
