//! Batch, response and report types for extraction

use cyberpolicy_domain::{Completion, PolicyRule};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// A bounded group of consecutive pages, sent to the model as one request
///
/// Batches are transient: one is built per cursor step and dropped once the
/// model call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Page texts joined with `=== PAGE n ===` markers
    pub text: String,

    /// 1-based page numbers included, in increasing order
    pub page_numbers: Vec<usize>,

    /// Words counted across the included pages
    pub word_count: usize,

    /// Budget the batch was built against
    pub max_words: usize,
}

impl Batch {
    /// Number of pages consumed by this batch
    pub fn len(&self) -> usize {
        self.page_numbers.len()
    }

    /// Whether no page fit under the budget
    pub fn is_empty(&self) -> bool {
        self.page_numbers.is_empty()
    }

    /// First page number, if any
    pub fn first_page(&self) -> Option<usize> {
        self.page_numbers.first().copied()
    }

    /// Last page number, if any
    pub fn last_page(&self) -> Option<usize> {
        self.page_numbers.last().copied()
    }
}

/// What the extraction requestor got back for one batch
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResponse {
    /// Raw text, expected to hold a JSON object
    Text(String),

    /// Payload the provider already parsed
    Structured(Value),

    /// The model could not be reached or returned an error
    Failed(String),
}

impl From<Completion> for ExtractionResponse {
    fn from(completion: Completion) -> Self {
        match completion {
            Completion::Text(text) => ExtractionResponse::Text(text),
            Completion::Structured(value) => ExtractionResponse::Structured(value),
        }
    }
}

/// Why a batch produced no rules
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchFailure {
    /// The text-generation call failed
    #[error("request failed: {reason}")]
    RequestFailed {
        /// Provider error message
        reason: String,
    },

    /// The response was not the expected JSON shape
    #[error("malformed response: {reason}")]
    MalformedResponse {
        /// Parser error message
        reason: String,
    },

    /// The first candidate page alone exhausts the word budget
    #[error("page has {page_words} words, budget is {max_words}")]
    EmptyBatch {
        /// Words on the page that did not fit
        page_words: usize,
        /// Word budget in effect
        max_words: usize,
    },
}

/// A page range the driver moved past without extracting rules from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRange {
    /// Country the document belongs to
    pub country: String,

    /// Document path
    pub document: PathBuf,

    /// First skipped page (1-based, inclusive)
    pub first_page: usize,

    /// Last skipped page (1-based, inclusive)
    pub last_page: usize,

    /// Condition that caused the skip
    pub reason: BatchFailure,
}

/// Outcome of processing one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    /// Country the document belongs to
    pub country: String,

    /// Document path
    pub path: PathBuf,

    /// Total pages in the document
    pub pages: usize,

    /// Final cursor position (equals `pages` once the document is exhausted)
    pub cursor: usize,

    /// Batches whose rules were accumulated
    pub batches: usize,

    /// Model calls made, including retries
    pub requests: usize,

    /// Rules appended from this document
    pub rules_added: usize,

    /// Ranges the cursor was forced past
    pub skipped: Vec<SkippedRange>,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Per-document reports, in processing order
    pub documents: Vec<DocumentReport>,

    /// Rules per country at the end of the run
    pub rules_by_country: BTreeMap<String, usize>,
}

impl RunSummary {
    /// Batches accumulated across all documents
    pub fn batches(&self) -> usize {
        self.documents.iter().map(|d| d.batches).sum()
    }

    /// Model calls made across all documents
    pub fn requests(&self) -> usize {
        self.documents.iter().map(|d| d.requests).sum()
    }

    /// Rules accumulated across all countries
    pub fn total_rules(&self) -> usize {
        self.rules_by_country.values().sum()
    }

    /// Every skipped range, in processing order
    pub fn skipped(&self) -> Vec<SkippedRange> {
        self.documents
            .iter()
            .flat_map(|d| d.skipped.iter().cloned())
            .collect()
    }
}

/// Internal representation of a rule as the model wrote it
///
/// Every field is optional so that a partially filled rule is still kept,
/// and any JSON value is accepted as text; `from_doc` is never read from the
/// model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RuleCandidate {
    #[serde(deserialize_with = "lenient_text")]
    pub country_code: String,
    #[serde(deserialize_with = "lenient_text")]
    pub rule_name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub rule_content: String,
    #[serde(deserialize_with = "lenient_text")]
    pub additional_info: String,
}

/// `null` reads as empty, strings as themselves, anything else as its JSON text
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

impl RuleCandidate {
    /// Turn the candidate into a rule tagged with its source document
    pub fn into_rule(self, from_doc: &str, fallback_country: &str) -> PolicyRule {
        let country_code = if self.country_code.trim().is_empty() {
            fallback_country.to_string()
        } else {
            self.country_code.trim().to_string()
        };

        PolicyRule {
            country_code,
            rule_name: self.rule_name,
            rule_content: self.rule_content,
            additional_info: self.additional_info,
            from_doc: from_doc.to_string(),
        }
    }

    /// Whether the model left the rule entirely blank
    pub fn is_blank(&self) -> bool {
        self.rule_name.trim().is_empty() && self.rule_content.trim().is_empty()
    }
}
