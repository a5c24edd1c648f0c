//! One model call per batch

use crate::config::PipelineConfig;
use crate::prompt::{PromptBuilder, SYSTEM_PROMPT};
use crate::types::{Batch, ExtractionResponse};
use cyberpolicy_domain::traits::LlmProvider;
use cyberpolicy_domain::GenerationRequest;
use std::fmt::Display;
use tracing::{debug, warn};

/// Build the generation request for one batch
pub fn build_request(config: &PipelineConfig, country: &str, batch: &Batch) -> GenerationRequest {
    let prompt = PromptBuilder::new(country, batch.text.as_str()).build();

    GenerationRequest::new(SYSTEM_PROMPT, prompt)
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
        .with_json_mode(config.json_mode)
}

/// Ask the model to extract rules from one batch
///
/// The response is returned uninterpreted. A provider failure becomes
/// [`ExtractionResponse::Failed`]; nothing is retried here.
pub fn request_extraction<L>(
    llm: &L,
    config: &PipelineConfig,
    country: &str,
    batch: &Batch,
) -> ExtractionResponse
where
    L: LlmProvider,
    L::Error: Display,
{
    let request = build_request(config, country, batch);
    debug!("Prompt length: {} chars", request.user.len());

    match llm.generate(&request) {
        Ok(completion) => {
            debug!(
                "Model {} responded with {} chars",
                llm.model_name(),
                completion.len()
            );
            completion.into()
        }
        Err(e) => {
            warn!("Model {} request failed: {}", llm.model_name(), e);
            ExtractionResponse::Failed(e.to_string())
        }
    }
}
