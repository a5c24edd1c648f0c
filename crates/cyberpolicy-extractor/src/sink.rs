//! Full-snapshot JSON persistence of the rule collection

use crate::error::ExtractorError;
use crate::types::SkippedRange;
use cyberpolicy_domain::traits::RuleSink;
use cyberpolicy_domain::RuleCollection;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Writes the whole collection to one JSON file after every batch
///
/// Each write goes to a temporary file in the target directory which is then
/// renamed over the output, so an interrupted run leaves either the previous
/// snapshot or the new one, never a truncated file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
    writes: usize,
}

impl JsonFileSink {
    /// Create a sink writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writes: 0,
        }
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of snapshots written so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Reload a snapshot written by this sink
    pub fn load(path: impl AsRef<Path>) -> Result<RuleCollection, ExtractorError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl RuleSink for JsonFileSink {
    type Error = ExtractorError;

    fn persist(&mut self, rules: &RuleCollection) -> Result<(), Self::Error> {
        write_json_atomic(&self.path, rules)?;
        self.writes += 1;
        debug!(
            "Wrote snapshot #{} with {} rules to {}",
            self.writes,
            rules.total_rules(),
            self.path.display()
        );
        Ok(())
    }
}

/// Write the page ranges a run had to skip, for later re-processing
pub fn write_skipped_report(path: impl AsRef<Path>, skipped: &[SkippedRange]) -> Result<(), ExtractorError> {
    write_json_atomic(path.as_ref(), skipped)
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExtractorError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|e| ExtractorError::Persistence(format!("{}: {}", path.display(), e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BatchFailure;
    use cyberpolicy_domain::PolicyRule;
    use tempfile::tempdir;

    fn rule(name: &str) -> PolicyRule {
        PolicyRule {
            country_code: "BR".to_string(),
            rule_name: name.to_string(),
            rule_content: "Invasão de dispositivo informático".to_string(),
            additional_info: "Lei 12.737/2012".to_string(),
            from_doc: "lei.pdf".to_string(),
        }
    }

    #[test]
    fn test_snapshot_reloads_equal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let mut sink = JsonFileSink::new(&path);

        let mut collection = RuleCollection::new();
        collection.append("BR", vec![rule("a")]);
        sink.persist(&collection).unwrap();
        assert_eq!(JsonFileSink::load(&path).unwrap(), collection);

        collection.append("BR", vec![rule("b")]);
        collection.ensure_country("AR");
        sink.persist(&collection).unwrap();
        assert_eq!(JsonFileSink::load(&path).unwrap(), collection);
        assert_eq!(sink.writes(), 2);
    }

    #[test]
    fn test_overwrites_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, "{\"stale\": \"content that is much longer than the next snapshot\"}").unwrap();

        let mut sink = JsonFileSink::new(&path);
        sink.persist(&RuleCollection::new()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
    }

    #[test]
    fn test_creates_missing_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("nested").join("rules.json");
        let mut sink = JsonFileSink::new(&path);
        sink.persist(&RuleCollection::new()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_output_is_human_readable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let mut collection = RuleCollection::new();
        collection.append("BR", vec![rule("a")]);
        JsonFileSink::new(&path).persist(&collection).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\n  \"BR\": [\n"));
        assert!(contents.contains("Invasão"));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let result = JsonFileSink::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ExtractorError::Io(_))));
    }

    #[test]
    fn test_skipped_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("skipped.json");
        let skipped = vec![SkippedRange {
            country: "BR".to_string(),
            document: PathBuf::from("policies/BR/lei.pdf"),
            first_page: 4,
            last_page: 6,
            reason: BatchFailure::RequestFailed {
                reason: "HTTP 503".to_string(),
            },
        }];
        write_skipped_report(&path, &skipped).unwrap();

        let reloaded: Vec<SkippedRange> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded, skipped);
    }
}
