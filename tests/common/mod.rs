//! Hand-written fakes for the two outbound ports, shared across the
//! integration tests. No network access; every response is canned.

use async_trait::async_trait;
use opsbrain_engine::domain::errors::{ToolInvocationError, TransportError};
use opsbrain_engine::domain::ports::{LlmClient, ToolTransport, ToolTransportError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Returns a canned response per tool name; any tool not in the map
/// produces a `ToolInvocationError` (as a real tool registry would for an
/// unknown tool), unless `fail_all` is set, which simulates an outage.
pub struct FakeToolTransport {
    responses: HashMap<String, Value>,
    fail_all: bool,
    calls: Mutex<Vec<(String, Value)>>,
}

impl FakeToolTransport {
    pub fn new() -> Self {
        Self { responses: HashMap::new(), fail_all: false, calls: Mutex::new(Vec::new()) }
    }

    pub fn failing() -> Self {
        Self { responses: HashMap::new(), fail_all: true, calls: Mutex::new(Vec::new()) }
    }

    pub fn with_response(mut self, tool: &str, response: Value) -> Self {
        self.responses.insert(tool.to_string(), response);
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolTransport for FakeToolTransport {
    async fn invoke(&self, tool: &str, arguments: Value) -> Result<Value, ToolTransportError> {
        self.calls.lock().unwrap().push((tool.to_string(), arguments));

        if self.fail_all {
            return Err(TransportError::Timeout { endpoint: "fake://tools".to_string(), timeout_secs: 1 }.into());
        }

        self.responses
            .get(tool)
            .cloned()
            .ok_or_else(|| ToolInvocationError { tool: tool.to_string(), status: 404, message: "no such tool".to_string() }.into())
    }
}

/// Always fails, driving every caller down its deterministic fallback path
/// (keyword planner, bullet-summary synthesis).
pub struct FailingLlmClient;

#[async_trait]
impl LlmClient for FailingLlmClient {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, TransportError> {
        Err(TransportError::Timeout { endpoint: "fake://llm".to_string(), timeout_secs: 1 })
    }
}

/// Returns a fixed completion regardless of input, for tests that need the
/// LLM path to succeed (e.g. the data analyst's SQL generation).
pub struct ScriptedLlmClient {
    pub response: String,
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, TransportError> {
        Ok(self.response.clone())
    }
}
