//! opsbrain-engine — a multi-agent operations reasoning orchestrator for an
//! e-commerce back office.
//!
//! The planner composes a battle plan from a fixed agent registry, the
//! dispatcher runs it concurrently with retry, the evaluator decides
//! whether to re-plan or synthesize, and the HITL gate suspends a run for
//! human approval whenever an agent proposes a mutation.

pub mod agents;
pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::config::{Config, ConfigError, ConfigLoader};
pub use services::Engine;
