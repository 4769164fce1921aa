//! HTTP implementation of `ToolTransport`: a single pooled `reqwest::Client`
//! shared by every agent in a run, talking to one `POST /invoke` endpoint.

use crate::domain::errors::{ToolInvocationError, TransportError};
use crate::domain::ports::tool_transport::{ToolTransport, ToolTransportError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

#[derive(serde::Serialize)]
struct InvokeRequest<'a> {
    tool: &'a str,
    arguments: Value,
}

#[derive(serde::Deserialize)]
struct InvokeSuccess {
    result: Value,
}

#[derive(serde::Deserialize)]
struct InvokeFailureBody {
    error: InvokeFailureDetail,
}

#[derive(serde::Deserialize)]
struct InvokeFailureDetail {
    #[serde(default)]
    message: String,
}

pub struct HttpToolTransport {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl HttpToolTransport {
    pub fn new(endpoint: String, api_key: String, timeout_secs: u64) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(timeout_secs)).pool_max_idle_per_host(10).build()?;
        Ok(Self { http, endpoint, api_key })
    }
}

#[async_trait]
impl ToolTransport for HttpToolTransport {
    async fn invoke(&self, tool: &str, arguments: Value) -> Result<Value, ToolTransportError> {
        let response = self
            .http
            .post(format!("{}/invoke", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&InvokeRequest { tool, arguments })
            .send()
            .await
            .map_err(|e| TransportError::Network { endpoint: self.endpoint.clone(), source: e })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<InvokeFailureBody>(&body).map(|b| b.error.message).unwrap_or(body);
            warn!(tool, status = status.as_u16(), "tool invocation reported an error");
            return Err(ToolInvocationError { tool: tool.to_string(), status: status.as_u16(), message }.into());
        }

        let body = response.text().await.map_err(|e| TransportError::Network { endpoint: self.endpoint.clone(), source: e })?;
        let parsed: InvokeSuccess = serde_json::from_str(&body).map_err(TransportError::MalformedJson)?;
        info!(tool, "tool invocation succeeded");
        Ok(parsed.result)
    }
}
