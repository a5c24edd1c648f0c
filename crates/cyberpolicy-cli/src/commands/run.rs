//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use cyberpolicy_extractor::{
    locate_documents, write_skipped_report, JsonFileSink, PdfPageSource, Pipeline, PipelineConfig,
};
use cyberpolicy_llm::{ChatCompletionsProvider, ChatSettings};
use std::path::PathBuf;
use tracing::info;

/// Everything a run needs once flags and config are merged.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Document root
    pub policies: PathBuf,
    /// Rule collection output
    pub output: PathBuf,
    /// Skipped-range report, if requested
    pub skipped_report: Option<PathBuf>,
    /// Pipeline settings
    pub pipeline: PipelineConfig,
    /// Provider settings
    pub chat: ChatSettings,
}

/// Merge command-line flags over the loaded configuration.
pub fn resolve_run(args: RunArgs, config: &Config) -> Result<RunSettings> {
    let mut pipeline = config.pipeline.clone();
    if args.thorough {
        // Only batching and retry come from the preset; sampling stays as configured
        let thorough = PipelineConfig::thorough();
        pipeline.max_words = thorough.max_words;
        pipeline.max_attempts = thorough.max_attempts;
        pipeline.retry_backoff_ms = thorough.retry_backoff_ms;
    }
    if let Some(max_words) = args.max_words {
        pipeline.max_words = max_words;
    }
    if let Some(max_attempts) = args.max_attempts {
        pipeline.max_attempts = max_attempts;
    }
    pipeline.validate().map_err(CliError::InvalidInput)?;

    let mut llm = config.llm.clone();
    if let Some(model) = args.model {
        llm.model = model;
    }
    if let Some(endpoint) = args.endpoint {
        llm.endpoint = endpoint;
    }
    let chat = llm.chat_settings(args.api_key);
    if chat.api_key.is_none() {
        return Err(CliError::Config(format!(
            "No API key: set {} or pass --api-key",
            llm.api_key_env
        )));
    }

    Ok(RunSettings {
        policies: args.policies.unwrap_or_else(|| config.paths.policies_dir.clone()),
        output: args.output.unwrap_or_else(|| config.paths.output.clone()),
        skipped_report: args.skipped_report.or_else(|| config.paths.skipped_report.clone()),
        pipeline,
        chat,
    })
}

/// Execute the run command.
pub fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let run = resolve_run(args, config)?;

    let documents = locate_documents(&run.policies, &run.pipeline.document_extension)?;
    if documents.is_empty() {
        println!(
            "{}",
            formatter.warning(&format!("No documents under {}", run.policies.display()))
        );
    }

    info!("Using model {} at {}", run.chat.model, run.chat.endpoint);
    let llm = ChatCompletionsProvider::new(run.chat)?;
    let sink = JsonFileSink::new(&run.output);
    let mut pipeline = Pipeline::new(llm, PdfPageSource::new(), sink, run.pipeline)?;

    let summary = pipeline.run(&documents)?;

    if let Some(path) = &run.skipped_report {
        write_skipped_report(path, &summary.skipped())?;
        info!("Skipped ranges written to {}", path.display());
    }

    println!("{}", formatter.format_summary(&summary)?);
    println!(
        "{}",
        formatter.info(&format!("Rules written to {}", run.output.display()))
    );

    Ok(())
}
