use super::prompts;

/// The message set for one generation call.
pub struct PromptMessages {
    pub system: String,
    pub user: String,
    /// Extra user turn carrying the '@bot' instruction, when one was given.
    pub instruction: Option<String>,
}

/// Instruction for the function-calling model. The manifest renders the same
/// sentence from its inputs, so identical refs always produce an identical
/// prompt.
pub fn function_calling_prompt(base_ref: &str, head_ref: &str, repository: &str) -> String {
    format!(
        "Compare the branches {base_ref} and {head_ref} in the GitHub repository {repository}."
    )
}

/// System message for the invocation-resolution call.
pub fn invocation_resolver_system() -> String {
    prompts::INVOCATION_RESOLVER.to_string()
}

/// Assemble the generation messages from the resolved system prompt, the
/// changed-files subtree, and the optional custom instruction.
pub fn pr_text_messages(
    system_prompt: &str,
    diff_subtree: &str,
    custom_instruction: Option<&str>,
) -> PromptMessages {
    PromptMessages {
        system: system_prompt.to_string(),
        user: diff_subtree.to_string(),
        instruction: custom_instruction.map(str::to_string),
    }
}
