//! Static per-agent descriptors consumed only by the planner when it
//! composes the LLM system prompt.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AgentCapability {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [&'static str],
    pub example_queries: [&'static str; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentMetadata {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub capabilities: Vec<AgentCapability>,
    pub keywords: Vec<&'static str>,
    pub priority_boost_phrases: Vec<&'static str>,
}

impl AgentMetadata {
    /// Renders this agent's metadata as a labeled section for the planner's
    /// system prompt (display name, description, capabilities with
    /// parameters and example queries, trigger keywords).
    pub fn render_section(&self) -> String {
        let mut out = format!("## {} ({})\n{}\n", self.display_name, self.name, self.description);
        for cap in &self.capabilities {
            out.push_str(&format!(
                "- capability `{}`: {} (parameters: {}; e.g. \"{}\", \"{}\")\n",
                cap.name,
                cap.description,
                cap.parameters.join(", "),
                cap.example_queries[0],
                cap.example_queries[1],
            ));
        }
        out.push_str(&format!("- trigger keywords: {}\n", self.keywords.join(", ")));
        out
    }
}
