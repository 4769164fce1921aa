//! HTTP adapters for the two outbound ports: the tool transport and the
//! LLM completion endpoint.

pub mod llm_client;
pub mod tool_transport_client;

pub use llm_client::HttpLlmClient;
pub use tool_transport_client::HttpToolTransport;
