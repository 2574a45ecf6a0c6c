use anyhow::Result;
use serde_json::Value;

use super::{Generation, LlmClient, ToolSpec};
use crate::github::CompareInvocation;

/// Dry-run client: no network, deterministic output. Serves local experiments
/// and the integration tests.
pub struct DryRunClient {
    base_ref: String,
    head_ref: String,
    repository: String,
}

impl DryRunClient {
    pub fn new(base_ref: String, head_ref: String, repository: String) -> Self {
        DryRunClient {
            base_ref,
            head_ref,
            repository,
        }
    }
}

impl LlmClient for DryRunClient {
    fn resolve_compare_invocation(&self, _prompt: &str, _tool: &ToolSpec) -> Result<Value> {
        let invocation =
            CompareInvocation::from_refs(&self.base_ref, &self.head_ref, &self.repository)?;
        Ok(serde_json::to_value(invocation)?)
    }

    fn generate_pr_text(
        &self,
        _system_prompt: &str,
        _diff_subtree: &str,
        custom_instruction: Option<&str>,
    ) -> Result<Generation> {
        let mut text = String::from("Dry-run PR description (no model calls)\n\n");
        text.push_str(&format!(
            "Repository: {repo}\nBase branch: {base}\nHead branch: {head}\n",
            repo = self.repository,
            base = self.base_ref,
            head = self.head_ref
        ));

        if let Some(instruction) = custom_instruction {
            text.push_str(&format!("Custom instruction: {instruction}\n"));
        }

        Ok(Generation { text, stats: None })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn client() -> DryRunClient {
        DryRunClient::new("main".into(), "feature/login".into(), "octo/widgets".into())
    }

    #[test]
    fn resolves_the_invocation_without_a_model() {
        let tool = ToolSpec {
            name: "compare_branches".into(),
            description: String::new(),
            parameters: json!({}),
        };

        let args = client().resolve_compare_invocation("ignored", &tool).unwrap();
        assert_eq!(args["parameters"]["basehead"], "main...feature/login");
        assert_eq!(args["parameters"]["owner"], "octo");
        assert_eq!(args["parameters"]["repo"], "widgets");
    }

    #[test]
    fn placeholder_text_carries_the_refs_and_instruction() {
        let generation = client()
            .generate_pr_text("system", "[]", Some("be brief"))
            .unwrap();

        assert!(generation.stats.is_none());
        assert!(generation.text.contains("octo/widgets"));
        assert!(generation.text.contains("main"));
        assert!(generation.text.contains("feature/login"));
        assert!(generation.text.contains("be brief"));
    }
}
