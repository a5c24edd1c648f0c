//! Cyberpolicy Extractor
//!
//! Turns a corpus of policy documents into a country-keyed collection of
//! cybercrime-related policy rules using an LLM.
//!
//! # Overview
//!
//! Each document is cut into batches of consecutive pages that fit a word
//! budget. Every batch is sent to the model with a fixed extraction prompt,
//! the JSON response is parsed into rules tagged with their source document,
//! and the rules are appended to the collection. The whole collection is
//! written to disk after every batch, so an interrupted run keeps everything
//! extracted up to that point.
//!
//! # Architecture
//!
//! ```text
//! locate_documents → batch_pages → request_extraction → accumulate → RuleSink
//!        ↑                                                              │
//!        └───────────────── Pipeline (cursor loop) ─────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use cyberpolicy_extractor::{locate_documents, JsonFileSink, PdfPageSource, Pipeline, PipelineConfig};
//! use cyberpolicy_llm::MockProvider;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let documents = locate_documents(Path::new("./policies"), &config.document_extension)?;
//!
//! let llm = MockProvider::new(r#"{"cybercrime_related_policy_rules": []}"#);
//! let sink = JsonFileSink::new("./policy_rules_by_country.json");
//! let mut pipeline = Pipeline::new(llm, PdfPageSource::new(), sink, config)?;
//!
//! let summary = pipeline.run(&documents)?;
//! println!("Extracted {} rules", summary.total_rules());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod accumulator;
mod batching;
mod config;
mod error;
mod locator;
mod pdf;
mod pipeline;
mod prompt;
mod requestor;
mod sink;
mod types;


pub use accumulator::{accumulate, parse_rules};
pub use batching::{batch_pages, word_count};
pub use config::PipelineConfig;
pub use error::ExtractorError;
pub use locator::{document_name, locate_documents, DocumentMap, ROOT_CATEGORY};
pub use pdf::PdfPageSource;
pub use pipeline::Pipeline;
pub use prompt::{PromptBuilder, RULES_KEY, SYSTEM_PROMPT};
pub use requestor::{build_request, request_extraction};
pub use sink::{write_skipped_report, JsonFileSink};
pub use types::{Batch, BatchFailure, DocumentReport, ExtractionResponse, RunSummary, SkippedRange};
