//! PDF page text via lopdf

use crate::error::ExtractorError;
use cyberpolicy_domain::traits::PageSource;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, warn};

/// Reads a PDF file as one text string per page
///
/// A file that cannot be opened or parsed is an error. A single page whose
/// text cannot be extracted (image-only scans, unsupported fonts) is kept as
/// an empty page so page numbering stays aligned with the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPageSource;

impl PdfPageSource {
    /// Create a PDF page source
    pub fn new() -> Self {
        Self
    }
}

impl PageSource for PdfPageSource {
    type Error = ExtractorError;

    fn read_pages(&self, path: &Path) -> Result<Vec<String>, Self::Error> {
        let doc = Document::load(path).map_err(|e| ExtractorError::Document {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();
        let mut pages = Vec::with_capacity(page_numbers.len());

        for page_number in page_numbers {
            match doc.extract_text(&[page_number]) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    warn!(
                        "No text on page {} of {}: {}",
                        page_number,
                        path.display(),
                        e
                    );
                    pages.push(String::new());
                }
            }
        }

        debug!("Read {} pages from {}", pages.len(), path.display());
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_document_error() {
        let dir = tempdir().unwrap();
        let result = PdfPageSource::new().read_pages(&dir.path().join("absent.pdf"));
        assert!(matches!(result, Err(ExtractorError::Document { .. })));
    }

    #[test]
    fn test_corrupt_file_is_document_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.pdf");
        fs::write(&path, b"this is not a pdf").unwrap();

        let result = PdfPageSource::new().read_pages(&path);
        match result {
            Err(ExtractorError::Document { path: p, .. }) => assert!(p.ends_with("corrupt.pdf")),
            other => panic!("expected document error, got {:?}", other),
        }
    }
}
