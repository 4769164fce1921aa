//! Process-wide immutable configuration, assembled once at startup.
//!
//! Layered the way the rest of this ecosystem loads configuration: built-in
//! defaults, then an optional YAML file, then environment variables
//! (prefixed `OPSBRAIN_`, double-underscore nested), with a validation pass
//! that turns any inconsistency into a typed `ConfigError` before the
//! process starts serving traffic.

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("tool transport endpoint must not be empty")]
    EmptyToolTransportEndpoint,

    #[error("LLM endpoint must not be empty")]
    EmptyLlmEndpoint,

    #[error("pending-action database url must not be empty")]
    EmptyDatabaseUrl,

    #[error("timeout_secs must be greater than zero, got {0}")]
    InvalidTimeout(u64),

    #[error("llm temperature must be within [0, 2], got {0}")]
    InvalidTemperature(f64),

    #[error("http bind address must not be empty")]
    EmptyBindAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub deployment: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: String::new(),
            deployment: String::new(),
            api_version: default_api_version(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolTransportSettings {
    #[serde(default = "default_tool_transport_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolTransportSettings {
    fn default() -> Self {
        Self {
            endpoint: default_tool_transport_endpoint(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySettings {
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: u32,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default)]
    pub pending_action_db: DatabaseSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub tool_transport: ToolTransportSettings,
    #[serde(default)]
    pub memory: MemorySettings,
    #[serde(default)]
    pub http: HttpSettings,

    pub observability_project: Option<String>,
}

fn default_app_env() -> String {
    "development".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_database_url() -> String {
    "sqlite://opsbrain.db".to_string()
}
fn default_max_connections() -> u32 {
    10
}
fn default_llm_endpoint() -> String {
    "http://localhost:8081/v1/chat".to_string()
}
fn default_api_version() -> String {
    "2024-02-01".to_string()
}
fn default_temperature() -> f64 {
    0.2
}
fn default_tool_transport_endpoint() -> String {
    "http://localhost:8082".to_string()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_embedding_dimension() -> u32 {
    1536
}
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from defaults, an optional `config.yaml`, a
    /// `config.local.yaml` override, then `OPSBRAIN_`-prefixed environment
    /// variables, validating the merged result.
    pub fn load() -> Result<Config, ConfigError> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("config.yaml"))
            .merge(Yaml::file("config.local.yaml"))
            .merge(Env::prefixed("OPSBRAIN_").split("__"))
            .extract()?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.tool_transport.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyToolTransportEndpoint);
        }
        if config.llm.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyLlmEndpoint);
        }
        if config.pending_action_db.url.trim().is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }
        if config.tool_transport.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.tool_transport.timeout_secs));
        }
        if !(0.0..=2.0).contains(&config.llm.temperature) {
            return Err(ConfigError::InvalidTemperature(config.llm.temperature));
        }
        if config.http.bind_addr.trim().is_empty() {
            return Err(ConfigError::EmptyBindAddr);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = Config::default();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let mut config = Config::default();
        config.llm.temperature = 5.0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTemperature(_))
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = Config::default();
        config.tool_transport.timeout_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTimeout(0))
        ));
    }
}
