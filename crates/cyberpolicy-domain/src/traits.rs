//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction pipeline and
//! infrastructure. Implementations live in other crates.

use crate::{Completion, GenerationRequest, RuleCollection};
use std::path::Path;

/// Trait for text-generation model providers
///
/// Implemented by the infrastructure layer (cyberpolicy-llm).
/// Providers own no retry policy: a failed call is reported once and the
/// caller decides what to do with it.
pub trait LlmProvider {
    /// Error type for generation operations
    type Error;

    /// Run one generation request
    fn generate(&self, request: &GenerationRequest) -> Result<Completion, Self::Error>;

    /// Name of the model behind this provider, for logging
    fn model_name(&self) -> &str;
}

/// Trait for reading a document as an ordered sequence of page texts
///
/// Implemented by the application layer (PDF reader in cyberpolicy-extractor).
pub trait PageSource {
    /// Error type for document reading
    type Error;

    /// Read every page of the document at `path`, in page order
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, Self::Error>;
}

/// Trait for durable snapshots of the rule collection
///
/// Each call replaces whatever the previous call wrote.
pub trait RuleSink {
    /// Error type for persistence operations
    type Error;

    /// Persist a full snapshot of the collection
    fn persist(&mut self, rules: &RuleCollection) -> Result<(), Self::Error>;
}
