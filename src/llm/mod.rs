pub mod dry_run;
pub mod openai;
pub mod prompt_builder;
mod prompts;

use anyhow::Result;
use serde::Serialize;
use serde_json::{Value, json};

/// Generated description plus the metadata of the call that produced it.
pub struct Generation {
    pub text: String,
    /// Absent on backends that report no usage (dry run).
    pub stats: Option<GenerationStats>,
}

/// Generation metadata, registered alongside the text as a `-stats` output.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationStats {
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Tool definition handed to the function-calling model.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSpec {
    /// Render as an OpenAI chat-completions tool.
    pub fn to_openai(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// Trait for talking to an LLM (real backend or dry-run).
pub trait LlmClient: Send + Sync {
    /// Resolve the compare-service invocation arguments from the
    /// function-calling prompt. The returned value is validated against the
    /// schema before it is executed.
    fn resolve_compare_invocation(&self, prompt: &str, tool: &ToolSpec) -> Result<Value>;

    /// Generate the PR description from the changed-files subtree.
    fn generate_pr_text(
        &self,
        system_prompt: &str,
        diff_subtree: &str,
        custom_instruction: Option<&str>,
    ) -> Result<Generation>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tool_spec_renders_the_openai_shape() {
        let tool = ToolSpec {
            name: "compare_branches".into(),
            description: "Compare two branches".into(),
            parameters: json!({ "type": "object" }),
        };

        let rendered = tool.to_openai();
        assert_eq!(rendered["type"], "function");
        assert_eq!(rendered["function"]["name"], "compare_branches");
        assert_eq!(rendered["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn stats_serialize_with_model_and_token_counts() {
        let stats = GenerationStats {
            model: "gpt-4o".into(),
            prompt_tokens: 100,
            completion_tokens: 50,
            total_tokens: 150,
        };

        let rendered = serde_json::to_value(&stats).unwrap();
        assert_eq!(rendered["model"], "gpt-4o");
        assert_eq!(rendered["total_tokens"], 150);
    }
}
