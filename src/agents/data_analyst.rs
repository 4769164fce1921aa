//! Terminal fallback agent: turns a free-form question into a single SQL
//! recommendation for a human to approve. Never executes anything itself.

use crate::domain::models::{AgentCapability, AgentMetadata, AgentRecommendation, AgentResult, AgentTask};
use crate::domain::ports::llm_client::LlmClient;
use crate::domain::ports::{Agent, AgentContext};
use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

const SENTINEL: &str = "CANNOT_GENERATE";

const SYSTEM_PROMPT: &str = "\
You are a SQL analyst for an e-commerce back office. Given a question, emit a single \
SQL statement (SELECT, WITH, INSERT, UPDATE, or DELETE) against the store's schema that \
would answer it. Reply with the statement only, no prose, no markdown fences. If the \
question cannot be answered with a SQL statement, reply with exactly CANNOT_GENERATE.";

pub struct DataAnalystAgent {
    llm: Arc<dyn LlmClient>,
}

impl DataAnalystAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn validate(statement: &str) -> Result<(), String> {
        let trimmed = statement.trim();
        if trimmed.is_empty() {
            return Err("LLM returned an empty statement".to_string());
        }
        if trimmed.contains(SENTINEL) {
            return Err("LLM indicated the question cannot be expressed as SQL".to_string());
        }
        let first_word = trimmed.split_whitespace().next().unwrap_or("").to_uppercase();
        if !matches!(first_word.as_str(), "SELECT" | "WITH" | "INSERT" | "UPDATE" | "DELETE") {
            return Err(format!("LLM returned a statement that doesn't start with a recognized keyword: {first_word}"));
        }
        Ok(())
    }
}

#[async_trait]
impl Agent for DataAnalystAgent {
    fn get_metadata(&self) -> AgentMetadata {
        AgentMetadata {
            name: "data_analyst",
            display_name: "DATA ANALYST",
            description: "Generates custom SQL for questions no other agent can answer. Terminal — never delegates.",
            capabilities: vec![AgentCapability {
                name: "custom_analysis",
                description: "Generate a SQL statement against the store schema for approval",
                parameters: &["query"],
                example_queries: ["Compare yesterday's sales to last week", "Break revenue down by region and channel"],
            }],
            keywords: vec!["custom", "analysis", "breakdown", "compare"],
            priority_boost_phrases: vec![],
        }
    }

    async fn run(&self, task: &AgentTask, context: &AgentContext<'_>) -> AgentResult {
        let query = task.query().unwrap_or(context.user_query);

        let completion = self.llm.complete(SYSTEM_PROMPT, query).await;
        let statement = match completion {
            Ok(s) => s,
            Err(e) => return AgentResult::Failure { error: e.to_string() },
        };
        let statement = statement.trim().trim_start_matches("```sql").trim_start_matches("```").trim_end_matches("```").trim();

        if let Err(reason) = Self::validate(statement) {
            return AgentResult::Failure { error: reason };
        }

        let mut findings = BTreeMap::new();
        findings.insert("generated_sql".to_string(), json!(statement));

        let insights = vec![format!("Generated a SQL statement to answer: {query}")];
        let recommendations = vec![AgentRecommendation::mutating(
            "execute_custom_sql",
            json!({"statement": statement}),
            format!("No fixed-capability agent could answer \"{query}\"; generated custom SQL instead"),
        )];

        AgentResult::success(findings, insights).with_recommendations(recommendations)
    }
}
