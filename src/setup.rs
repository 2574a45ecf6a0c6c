use log::debug;

use crate::config::Config;
use crate::llm::LlmClient;
use crate::llm::dry_run::DryRunClient;
use crate::llm::openai::OpenAiClient;

/// Build the LLM client for this run.
pub fn build_llm_client(cfg: &Config) -> Box<dyn LlmClient> {
    if cfg.dry_run {
        debug!("Using DryRunClient (no model calls)");
        return Box::new(DryRunClient::new(
            cfg.base_ref.clone(),
            cfg.head_ref.clone(),
            cfg.github_repository.clone(),
        ));
    }

    debug!(
        "Using OpenAiClient: generation={}, function-calling={}",
        cfg.generation_model, cfg.function_calling_model
    );

    Box::new(OpenAiClient::new(
        cfg.openai_api_key.clone(),
        cfg.openai_base_url.clone(),
        cfg.generation_model.clone(),
        cfg.function_calling_model.clone(),
    ))
}
