//! Engine-wide error taxonomy.
//!
//! Every variant here corresponds to one failure mode the orchestration engine
//! can observe. Variants that are locally recoverable (retried by the
//! dispatcher) are distinguished from variants that must surface to the
//! caller by the policies documented alongside each component.

use thiserror::Error;

/// Network/HTTP-level failure talking to an external tool or the LLM endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {endpoint} timed out after {timeout_secs}s")]
    Timeout { endpoint: String, timeout_secs: u64 },

    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response body was not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),
}

/// A tool invocation completed at the HTTP layer but reported a structured failure.
#[derive(Debug, Error, Clone)]
#[error("tool '{tool}' reported an error ({status}): {message}")]
pub struct ToolInvocationError {
    pub tool: String,
    pub status: u16,
    pub message: String,
}

/// A tool (or LLM) response did not match the shape its caller expected.
#[derive(Debug, Error)]
#[error("validation failed for {context}: {reason}")]
pub struct ValidationError {
    pub context: String,
    pub reason: String,
}

/// The planner LLM emitted a plan that could not be parsed into tasks.
#[derive(Debug, Error)]
#[error("planner could not parse a battle plan from the LLM response: {0}")]
pub struct PlanningError(pub String);

/// An agent raised while running a task (as opposed to returning a tagged failure).
#[derive(Debug, Error)]
#[error("agent '{agent}' raised while running: {source}")]
pub struct AgentError {
    pub agent: String,
    #[source]
    pub source: anyhow::Error,
}

/// A HITL state transition violated the pending-action lifecycle invariants.
#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("pending action {0} not found")]
    NotFound(i64),

    #[error("pending action {id} is in status '{status}' and cannot transition to '{target}'")]
    InvalidTransition {
        id: i64,
        status: String,
        target: String,
    },
}

/// The action executor failed to carry out an approved action.
#[derive(Debug, Error)]
#[error("execution of action {action_id} failed: {message}")]
pub struct ExecutionError {
    pub action_id: i64,
    pub message: String,
    pub status_code: Option<u16>,
    pub response: Option<serde_json::Value>,
}

/// The checkpoint store had no (or a corrupt) snapshot for a thread.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("no checkpoint found for thread '{0}'")]
    NotFound(String),

    #[error("checkpoint for thread '{0}' could not be deserialized: {1}")]
    Corrupt(String, String),

    #[error("checkpoint store error: {0}")]
    Store(String),
}

/// Top-level error uniting every taxonomy member, used at the engine's own
/// boundary (e.g. the HTTP handlers) where a single `Result` type is wanted.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    ToolInvocation(#[from] ToolInvocationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
