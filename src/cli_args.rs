use clap::Parser;

/// CLI options
///
/// Every option doubles as an environment variable so the same binary serves
/// as the action's container entrypoint (env-driven) and as a local smoke
/// test (flag/positional-driven).
#[derive(Parser, Debug)]
#[command(
    name = "pr-auto-bot",
    version,
    about = "LLM-assisted pull request description generator"
)]
pub struct Cli {
    /// Repository to compare, in 'owner/name' form
    #[arg(env = "GITHUB_REPOSITORY")]
    pub github_repository: Option<String>,

    /// Base branch the pull request merges into
    #[arg(env = "BASE_REF")]
    pub base_ref: Option<String>,

    /// Head branch containing the changes
    #[arg(env = "HEAD_REF")]
    pub head_ref: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API endpoint
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    /// Token used to call the branch compare service (avoids rate limiting)
    #[arg(long, env = "OPENAPI_SERVICE_TOKEN")]
    pub service_token: Option<String>,

    /// Model that writes the pull request description
    #[arg(long, env = "TEXT_GENERATION_MODEL")]
    pub generation_model: Option<String>,

    /// Model that resolves the compare-service invocation
    #[arg(long, env = "FUNCTION_CALLING_MODEL")]
    pub function_calling_model: Option<String>,

    /// Instruction handed to the function-calling model; rebuilt from the
    /// refs when omitted
    #[arg(long, env = "FUNCTION_CALLING_PROMPT")]
    pub function_calling_prompt: Option<String>,

    /// Schema the resolved invocation is validated against (URL or path)
    #[arg(long, env = "FUNCTION_CALLING_VALIDATION_SCHEMA")]
    pub validation_schema: Option<String>,

    /// OpenAPI description of the compare service (URL or path)
    #[arg(long, env = "OPENAPI_SERVICE_SPEC")]
    pub service_spec: Option<String>,

    /// System prompt for the generation model: inline text, a URL, or a path
    #[arg(long, env = "SYSTEM_PROMPT")]
    pub system_prompt: Option<String>,

    /// Free-form user text; an "@<bot_name> <instruction>" mention customizes
    /// or skips the generation
    #[arg(long, env = "USER_PROMPT")]
    pub user_prompt: Option<String>,

    /// Mention name the bot answers to in the user prompt
    #[arg(long, env = "BOT_NAME")]
    pub bot_name: Option<String>,

    /// Subtree of the service response forwarded to the generation model
    #[arg(long, env = "SERVICE_RESPONSE_SUBTREE")]
    pub response_subtree: Option<String>,

    /// Name the generated text is registered under in GITHUB_OUTPUT
    #[arg(long, env = "OUTPUT_KEY")]
    pub output_key: Option<String>,

    /// Appended verbatim below the generated description
    #[arg(long, env = "ATTRIBUTION_MESSAGE")]
    pub attribution_message: Option<String>,

    /// Disable network calls; produce a deterministic placeholder description
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}
