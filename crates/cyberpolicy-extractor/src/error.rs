//! Error types for the Extractor

use thiserror::Error;

/// Errors that abort a pipeline run
///
/// Per-batch conditions (failed requests, malformed responses, empty
/// batches) are not errors; see [`crate::BatchFailure`].
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed
    #[error("Cannot walk document directory: {0}")]
    Walk(String),

    /// A document could not be read
    #[error("Cannot read document {path}: {reason}")]
    Document {
        /// Path of the document
        path: String,
        /// What went wrong
        reason: String,
    },

    /// The rule snapshot could not be written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

impl From<walkdir::Error> for ExtractorError {
    fn from(e: walkdir::Error) -> Self {
        ExtractorError::Walk(e.to_string())
    }
}
