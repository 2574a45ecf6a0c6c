use anyhow::{Context, Result, bail};

use crate::cli_args::Cli;
use crate::llm::prompt_builder;

pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o";
pub const DEFAULT_FUNCTION_CALLING_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_BOT_NAME: &str = "pr-auto-bot";
pub const DEFAULT_RESPONSE_SUBTREE: &str = "files";
pub const DEFAULT_OUTPUT_KEY: &str = "pr-text";

/// Final resolved configuration for a single run.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub service_token: String,
    pub github_repository: String,
    pub base_ref: String,
    pub head_ref: String,
    pub generation_model: String,
    pub function_calling_model: String,
    pub function_calling_prompt: String,
    /// Raw SYSTEM_PROMPT value; resolved to text by the asset loader.
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
    pub bot_name: String,
    pub validation_schema: Option<String>,
    pub service_spec: Option<String>,
    pub response_subtree: String,
    pub output_key: String,
    pub attribution_message: Option<String>,
    pub dry_run: bool,
}

impl Config {
    /// Build the final config from CLI flags / environment and defaults.
    ///
    /// clap already merged the two sources (flags win over env vars); this
    /// only applies defaults and rejects runs that cannot proceed. Both
    /// credentials are checked here so a misconfigured workflow fails before
    /// any network call is made.
    pub fn from_sources(cli: &Cli) -> Result<Self> {
        let openai_api_key = match cli.openai_api_key.clone() {
            Some(key) => key,
            None if cli.dry_run => String::new(),
            None => bail!("OPENAI_API_KEY must be set (env var or --openai-api-key)"),
        };

        let service_token = match cli.service_token.clone() {
            Some(token) => token,
            None if cli.dry_run => String::new(),
            None => bail!(
                "OPENAPI_SERVICE_TOKEN must be set (env var or --service-token); \
                 the GitHub token is required to call the compare service"
            ),
        };

        let github_repository = cli
            .github_repository
            .clone()
            .context("GITHUB_REPOSITORY must be provided as an environment variable or argument")?;
        let base_ref = cli
            .base_ref
            .clone()
            .context("BASE_REF must be provided as an environment variable or argument")?;
        let head_ref = cli
            .head_ref
            .clone()
            .context("HEAD_REF must be provided as an environment variable or argument")?;

        let function_calling_prompt = cli.function_calling_prompt.clone().unwrap_or_else(|| {
            prompt_builder::function_calling_prompt(&base_ref, &head_ref, &github_repository)
        });

        // The manifest passes BOT_NAME through even when the input is empty;
        // an empty name would match every '@' mention.
        let bot_name = cli
            .bot_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_BOT_NAME.to_string());

        Ok(Config {
            openai_api_key,
            openai_base_url: cli
                .openai_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            service_token,
            github_repository,
            base_ref,
            head_ref,
            generation_model: cli
                .generation_model
                .clone()
                .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
            function_calling_model: cli
                .function_calling_model
                .clone()
                .unwrap_or_else(|| DEFAULT_FUNCTION_CALLING_MODEL.to_string()),
            function_calling_prompt,
            system_prompt: cli.system_prompt.clone(),
            user_prompt: cli.user_prompt.clone(),
            bot_name,
            validation_schema: cli.validation_schema.clone(),
            service_spec: cli.service_spec.clone(),
            response_subtree: cli
                .response_subtree
                .clone()
                .unwrap_or_else(|| DEFAULT_RESPONSE_SUBTREE.to_string()),
            output_key: cli
                .output_key
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTPUT_KEY.to_string()),
            attribution_message: cli
                .attribution_message
                .clone()
                .filter(|message| !message.is_empty()),
            dry_run: cli.dry_run,
        })
    }
}
