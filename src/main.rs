use anyhow::{Context, Result};
use clap::Parser;

mod assets;
mod cli_args;
mod config;
mod github;
mod instructions;
mod llm;
mod logging;
mod output;
mod setup;

use cli_args::Cli;
use config::Config;
use github::{COMPARE_OPERATION, CompareInvocation};
use llm::{LlmClient, ToolSpec};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let cfg = Config::from_sources(&cli)?;
    run(&cfg)
}

fn run(cfg: &Config) -> Result<()> {
    let custom_instruction = cfg
        .user_prompt
        .as_deref()
        .and_then(|prompt| instructions::extract_custom_instruction(&cfg.bot_name, prompt));

    if let Some(instruction) = &custom_instruction {
        log::debug!("Custom instruction: {instruction}");
        if instructions::contains_skip_instruction(instruction) {
            println!("Skipping PR description generation, the user instruction contains 'skip'.");
            return Ok(());
        }
    }

    let llm = setup::build_llm_client(cfg);
    let diff_subtree = fetch_diff_subtree(cfg, llm.as_ref())?;

    let system_prompt = assets::resolve_system_prompt(cfg.system_prompt.as_deref())?;
    let generation =
        llm.generate_pr_text(&system_prompt, &diff_subtree, custom_instruction.as_deref())?;

    let mut pr_text = generation.text;
    if let Some(attribution) = &cfg.attribution_message {
        pr_text.push_str("\n\n");
        pr_text.push_str(attribution);
    }

    output::emit(&cfg.output_key, &pr_text)?;

    if let Some(stats) = &generation.stats {
        let rendered = serde_json::to_string(stats).context("failed to serialize the stats")?;
        output::register(&format!("{}-stats", cfg.output_key), &rendered)?;
    }

    Ok(())
}

/// Resolve the compare invocation through the function-calling model, check
/// it against the validation schema, execute it, and keep only the configured
/// response subtree.
fn fetch_diff_subtree(cfg: &Config, llm: &dyn LlmClient) -> Result<String> {
    let spec_text = assets::resolve_service_spec(cfg.service_spec.as_deref())?;
    let spec = github::ServiceSpec::parse(&spec_text)?;

    let schema_text = assets::resolve_validation_schema(cfg.validation_schema.as_deref())?;
    let schema: serde_json::Value =
        serde_json::from_str(&schema_text).context("failed to parse the validation schema")?;

    let tool = ToolSpec {
        name: COMPARE_OPERATION.to_string(),
        description: spec
            .operation_summary(COMPARE_OPERATION)
            .unwrap_or_default()
            .to_string(),
        parameters: schema.clone(),
    };

    let args = llm.resolve_compare_invocation(&cfg.function_calling_prompt, &tool)?;
    github::validate_invocation(&schema, &args)?;
    let invocation: CompareInvocation = serde_json::from_value(args)
        .context("the resolved arguments do not form a compare invocation")?;

    let service = github::CompareService::new(&spec, cfg.service_token.clone())?;

    if cfg.dry_run {
        log::info!(
            "Dry run: would call {}",
            service.invocation_url(&invocation)
        );
        return Ok(String::from("[]"));
    }

    let response = service.fetch(&invocation)?;

    github::response_subtree(&response, &cfg.response_subtree)
}
