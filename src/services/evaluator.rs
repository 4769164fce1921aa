//! Decides whether post-dispatch state is ready for synthesis or needs
//! another planning pass.

use crate::domain::models::GraphState;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluatorDecision {
    Synthesize,
    Replan { reason: String, route_to_analyst: bool },
}

pub struct Evaluator;

impl Evaluator {
    /// Rules evaluated in order; the first that matches decides.
    pub fn evaluate(state: &GraphState, failed_agents: &[String]) -> EvaluatorDecision {
        if state.replan_count >= state.max_replans {
            return EvaluatorDecision::Synthesize;
        }

        if !state.cannot_handle_agents.is_empty() && !state.agent_ran("data_analyst") {
            return EvaluatorDecision::Replan {
                reason: "cannot_handle routing".to_string(),
                route_to_analyst: true,
            };
        }

        if state.agent_findings.is_empty() {
            return EvaluatorDecision::Replan {
                reason: "no agents returned findings".to_string(),
                route_to_analyst: false,
            };
        }

        if let Some(top_task) = state.battle_plan.first() {
            if failed_agents.contains(&top_task.agent) {
                return EvaluatorDecision::Replan {
                    reason: "primary agent failed".to_string(),
                    route_to_analyst: false,
                };
            }
        }

        if state.agent_findings.values().all(|findings| findings.values().all(is_effectively_empty)) {
            return EvaluatorDecision::Replan {
                reason: "all agents returned empty results".to_string(),
                route_to_analyst: false,
            };
        }

        EvaluatorDecision::Synthesize
    }
}

fn is_effectively_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(_) => false,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn synthesizes_when_replan_budget_exhausted() {
        let mut state = GraphState::new("t1", "q");
        state.replan_count = 2;
        state.max_replans = 2;
        assert_eq!(Evaluator::evaluate(&state, &[]), EvaluatorDecision::Synthesize);
    }

    #[test]
    fn routes_to_analyst_on_cannot_handle() {
        let mut state = GraphState::new("t1", "q");
        state.cannot_handle_agents.push(crate::domain::models::CannotHandleEntry {
            agent: "sales".to_string(),
            query: "q".to_string(),
            reason: "out of scope".to_string(),
        });
        assert_eq!(
            Evaluator::evaluate(&state, &[]),
            EvaluatorDecision::Replan { reason: "cannot_handle routing".to_string(), route_to_analyst: true }
        );
    }

    #[test]
    fn replans_on_all_empty_findings() {
        let mut state = GraphState::new("t1", "q");
        let mut findings = BTreeMap::new();
        findings.insert("total".to_string(), Value::from(0));
        state.agent_findings.insert("sales".to_string(), findings);
        assert_eq!(
            Evaluator::evaluate(&state, &[]),
            EvaluatorDecision::Replan { reason: "all agents returned empty results".to_string(), route_to_analyst: false }
        );
    }
}
