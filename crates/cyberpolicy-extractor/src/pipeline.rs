//! Pipeline driver: documents → batches → model → rules → snapshot

use crate::accumulator::accumulate;
use crate::batching::{batch_pages, word_count};
use crate::config::PipelineConfig;
use crate::error::ExtractorError;
use crate::locator::{document_name, DocumentMap};
use crate::requestor::request_extraction;
use crate::types::{Batch, BatchFailure, DocumentReport, RunSummary, SkippedRange};
use cyberpolicy_domain::traits::{LlmProvider, PageSource, RuleSink};
use cyberpolicy_domain::RuleCollection;
use std::fmt::Display;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// How far the cursor moves after one batch
#[derive(Debug, Clone, PartialEq, Eq)]
enum CursorStep {
    /// Rules were accumulated and persisted
    Accumulated { pages: usize },

    /// The batch was given up on; the cursor moves past it anyway
    Forced { pages: usize, failure: BatchFailure },
}

/// Sequential extraction driver
///
/// Countries are processed one after another, documents within a country one
/// after another, and each document page-batch by page-batch. After every
/// batch whose rules were accumulated the full collection is handed to the
/// sink.
///
/// A batch that keeps failing is retried up to `max_attempts` times with
/// exponential backoff, then skipped and recorded as a [`SkippedRange`], so
/// one bad batch cannot stall the run. A page too large for the word budget
/// is skipped the same way.
pub struct Pipeline<L, P, S> {
    llm: L,
    pages: P,
    sink: S,
    config: PipelineConfig,
    rules: RuleCollection,
}

impl<L, P, S> Pipeline<L, P, S>
where
    L: LlmProvider,
    L::Error: Display,
    P: PageSource,
    P::Error: Into<ExtractorError>,
    S: RuleSink,
    S::Error: Into<ExtractorError>,
{
    /// Create a new Pipeline with an empty rule collection
    pub fn new(llm: L, pages: P, sink: S, config: PipelineConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            llm,
            pages,
            sink,
            config,
            rules: RuleCollection::new(),
        })
    }

    /// Rules accumulated so far
    pub fn rules(&self) -> &RuleCollection {
        &self.rules
    }

    /// The persistence sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Consume the pipeline, returning the collection and the sink
    pub fn into_parts(self) -> (RuleCollection, S) {
        (self.rules, self.sink)
    }

    /// Process every document of every country
    ///
    /// # Errors
    ///
    /// Unreadable documents and failed snapshot writes abort the run; the
    /// last successful snapshot stays on disk.
    pub fn run(&mut self, documents: &DocumentMap) -> Result<RunSummary, ExtractorError> {
        for country in documents.keys() {
            self.rules.ensure_country(country);
        }

        let mut summary = RunSummary::default();

        for (country, paths) in documents {
            info!("Processing {} documents for {}", paths.len(), country);
            for path in paths {
                let report = self.process_document(country, path)?;
                summary.documents.push(report);
            }
        }

        // Countries that never produced a batch still appear in the output
        self.persist()?;

        summary.rules_by_country = self
            .rules
            .iter()
            .map(|(country, rules)| (country.to_string(), rules.len()))
            .collect();

        info!(
            "Run complete: {} documents, {} batches, {} rules, {} skipped ranges",
            summary.documents.len(),
            summary.batches(),
            summary.total_rules(),
            summary.skipped().len()
        );

        Ok(summary)
    }

    /// Process one document from its first page to its last
    pub fn process_document(&mut self, country: &str, path: &Path) -> Result<DocumentReport, ExtractorError> {
        let pages = self.pages.read_pages(path).map_err(Into::into)?;
        let from_doc = document_name(path);

        info!("Processing {} ({} pages)", path.display(), pages.len());

        let mut report = DocumentReport {
            country: country.to_string(),
            path: path.to_path_buf(),
            pages: pages.len(),
            cursor: 0,
            batches: 0,
            requests: 0,
            rules_added: 0,
            skipped: Vec::new(),
        };

        while report.cursor < pages.len() {
            let batch = batch_pages(&pages, report.cursor, self.config.max_words);

            let step = if batch.is_empty() {
                CursorStep::Forced {
                    pages: 1,
                    failure: BatchFailure::EmptyBatch {
                        page_words: word_count(&pages[report.cursor]),
                        max_words: self.config.max_words,
                    },
                }
            } else {
                self.run_batch(country, &from_doc, &batch, &mut report)?
            };

            match step {
                CursorStep::Accumulated { pages } => report.cursor += pages,
                CursorStep::Forced { pages, failure } => {
                    let skipped = SkippedRange {
                        country: country.to_string(),
                        document: path.to_path_buf(),
                        first_page: report.cursor + 1,
                        last_page: report.cursor + pages,
                        reason: failure,
                    };
                    warn!(
                        "Skipping pages {}-{} of {}: {}",
                        skipped.first_page,
                        skipped.last_page,
                        path.display(),
                        skipped.reason
                    );
                    report.skipped.push(skipped);
                    report.cursor += pages;
                }
            }
        }

        debug!(
            "Finished {}: {} batches, {} requests, {} rules",
            from_doc, report.batches, report.requests, report.rules_added
        );

        Ok(report)
    }

    /// Request, parse, accumulate and persist one batch, retrying on failure
    fn run_batch(
        &mut self,
        country: &str,
        from_doc: &str,
        batch: &Batch,
        report: &mut DocumentReport,
    ) -> Result<CursorStep, ExtractorError> {
        let started = Instant::now();
        let mut last_failure = BatchFailure::RequestFailed {
            reason: "no attempt made".to_string(),
        };

        for attempt in 1..=self.config.max_attempts {
            report.requests += 1;
            let response = request_extraction(&self.llm, &self.config, country, batch);

            match accumulate(&mut self.rules, country, from_doc, &response) {
                Ok(added) => {
                    self.persist()?;
                    report.batches += 1;
                    report.rules_added += added;
                    info!(
                        "Processed pages {:?} of {} in {:.2} seconds ({} rules)",
                        batch.page_numbers,
                        from_doc,
                        started.elapsed().as_secs_f64(),
                        added
                    );
                    return Ok(CursorStep::Accumulated { pages: batch.len() });
                }
                Err(failure) => {
                    warn!(
                        "Attempt {}/{} for pages {:?} of {} failed: {}",
                        attempt, self.config.max_attempts, batch.page_numbers, from_doc, failure
                    );
                    last_failure = failure;
                    if attempt < self.config.max_attempts {
                        std::thread::sleep(self.config.retry_delay(attempt));
                    }
                }
            }
        }

        Ok(CursorStep::Forced {
            pages: batch.len(),
            failure: last_failure,
        })
    }

    fn persist(&mut self) -> Result<(), ExtractorError> {
        self.sink.persist(&self.rules).map_err(Into::into)
    }
}
