//! HTTP implementation of `LlmClient`: a single pooled client talking to a
//! chat-completion endpoint over `{system, user}` messages, no function
//! calling assumed.

use crate::domain::errors::TransportError;
use crate::domain::ports::llm_client::LlmClient;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    system: &'a str,
    user: &'a str,
    temperature: f64,
    deployment: &'a str,
    api_version: &'a str,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    content: String,
}

pub struct HttpLlmClient {
    http: Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
    temperature: f64,
}

impl HttpLlmClient {
    pub fn new(endpoint: String, api_key: String, deployment: String, api_version: String, temperature: f64) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(60)).pool_max_idle_per_host(10).build()?;
        Ok(Self { http, endpoint, api_key, deployment, api_version, temperature })
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, TransportError> {
        let request = ChatRequest { system, user, temperature: self.temperature, deployment: &self.deployment, api_version: &self.api_version };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network { endpoint: self.endpoint.clone(), source: e })?
            .error_for_status()
            .map_err(|e| {
                warn!(status = ?e.status(), "llm endpoint returned a non-success status");
                TransportError::Network { endpoint: self.endpoint.clone(), source: e }
            })?;

        let body = response.text().await.map_err(|e| TransportError::Network { endpoint: self.endpoint.clone(), source: e })?;
        let parsed: ChatResponse = serde_json::from_str(&body).map_err(TransportError::MalformedJson)?;
        info!("llm completion received");
        Ok(parsed.content)
    }
}
