//! Plan command implementation.

use crate::cli::PlanArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use cyberpolicy_domain::traits::PageSource;
use cyberpolicy_extractor::{batch_pages, word_count, PdfPageSource};
use serde::Serialize;

/// One request the pipeline would make, or one page it would have to skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedBatch {
    /// First page (1-based)
    pub first_page: usize,
    /// Last page (1-based, inclusive)
    pub last_page: usize,
    /// Words sent in this batch
    pub words: usize,
    /// The page alone reaches the word budget
    pub oversized: bool,
}

/// Execute the plan command.
pub fn execute_plan(args: PlanArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let max_words = args.max_words.unwrap_or(config.pipeline.max_words);
    if max_words == 0 {
        return Err(CliError::InvalidInput("--max-words must be greater than 0".to_string()));
    }

    let pages = PdfPageSource::new().read_pages(&args.document)?;
    let plan = plan_batches(&pages, max_words);

    println!("{}", formatter.format_plan(&args.document, &plan)?);

    Ok(())
}

/// Walk the pages the way the pipeline cursor does, without calling a model.
pub fn plan_batches<S: AsRef<str>>(pages: &[S], max_words: usize) -> Vec<PlannedBatch> {
    let mut plan = Vec::new();
    let mut cursor = 0;

    while cursor < pages.len() {
        let batch = batch_pages(pages, cursor, max_words);
        match (batch.first_page(), batch.last_page()) {
            (Some(first_page), Some(last_page)) => {
                plan.push(PlannedBatch {
                    first_page,
                    last_page,
                    words: batch.word_count,
                    oversized: false,
                });
                cursor += batch.len();
            }
            _ => {
                plan.push(PlannedBatch {
                    first_page: cursor + 1,
                    last_page: cursor + 1,
                    words: word_count(pages[cursor].as_ref()),
                    oversized: true,
                });
                cursor += 1;
            }
        }
    }

    plan
}
