use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Generation, GenerationStats, LlmClient, ToolSpec, prompt_builder};

/// Empirically enough for a PR description.
const GENERATION_MAX_TOKENS: u32 = 2560;

/// Minimal request/response structs for the OpenAI Chat Completions API.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    /// JSON-encoded arguments, as the API returns them.
    arguments: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// OpenAI-based implementation of LlmClient.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    api_base_url: String,
    generation_model: String,
    function_calling_model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        api_base_url: String,
        generation_model: String,
        function_calling_model: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .expect("failed to build HTTP client");

        OpenAiClient {
            client,
            api_key,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            generation_model,
            function_calling_model,
        }
    }

    fn chat_url(&self) -> String {
        if self.api_base_url.ends_with("/v1") {
            format!("{}/chat/completions", self.api_base_url)
        } else {
            format!("{}/v1/chat/completions", self.api_base_url)
        }
    }

    fn call_chat(&self, req: &ChatRequest) -> Result<(ChatMessageResponse, Option<ChatUsage>)> {
        let url = self.chat_url();

        log::info!("Calling OpenAI model {:?}", &req.model);

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .context("failed to send request to OpenAI")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(anyhow!(
                "OpenAI API error: HTTP {} - {}",
                status.as_u16(),
                text
            ));
        }

        let chat_resp: ChatResponse = resp.json().context("failed to parse OpenAI response")?;

        if let Some(usage) = &chat_resp.usage {
            log::info!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        let message = chat_resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| anyhow!("no choices returned from OpenAI"))?;

        Ok((message, chat_resp.usage))
    }
}

impl LlmClient for OpenAiClient {
    fn resolve_compare_invocation(&self, prompt: &str, tool: &ToolSpec) -> Result<Value> {
        log::debug!("Function-calling prompt:\n{}", truncate(prompt, 2000));

        let req = ChatRequest {
            model: self.function_calling_model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: prompt_builder::invocation_resolver_system(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: None,
            tools: Some(vec![tool.to_openai()]),
            tool_choice: Some(serde_json::json!({
                "type": "function",
                "function": { "name": tool.name }
            })),
        };

        let (message, _usage) = self.call_chat(&req)?;
        let call = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("the function-calling model returned no tool call"))?;

        if call.function.name != tool.name {
            return Err(anyhow!(
                "the function-calling model called {:?} instead of {:?}",
                call.function.name,
                tool.name
            ));
        }

        log::trace!("Resolved invocation arguments: {}", call.function.arguments);

        serde_json::from_str(&call.function.arguments)
            .context("failed to parse the tool-call arguments")
    }

    fn generate_pr_text(
        &self,
        system_prompt: &str,
        diff_subtree: &str,
        custom_instruction: Option<&str>,
    ) -> Result<Generation> {
        let prompts =
            prompt_builder::pr_text_messages(system_prompt, diff_subtree, custom_instruction);

        log::debug!(
            "PR description prompt:\n{}",
            truncate(&prompts.user, 3500)
        );

        let mut messages = vec![
            ChatMessage {
                role: "system".into(),
                content: prompts.system,
            },
            ChatMessage {
                role: "user".into(),
                content: prompts.user,
            },
        ];
        if let Some(instruction) = prompts.instruction {
            messages.push(ChatMessage {
                role: "user".into(),
                content: instruction,
            });
        }

        let req = ChatRequest {
            model: self.generation_model.clone(),
            messages,
            max_tokens: Some(GENERATION_MAX_TOKENS),
            tools: None,
            tool_choice: None,
        };

        let (message, usage) = self.call_chat(&req)?;
        let text = message
            .content
            .filter(|text| !text.is_empty())
            .ok_or_else(|| anyhow!("the generation model returned no content"))?;

        let stats = usage.map(|usage| GenerationStats {
            model: self.generation_model.clone(),
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        });

        Ok(Generation { text, stats })
    }
}

/// Truncate long strings for debug logging.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...\n[truncated {} chars]", &s[..max_len], s.len() - max_len)
    }
}
