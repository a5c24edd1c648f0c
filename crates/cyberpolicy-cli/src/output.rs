//! Output formatting for the CLI.

use crate::commands::plan::PlannedBatch;
use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use cyberpolicy_domain::RuleCollection;
use cyberpolicy_extractor::{document_name, DocumentMap, RunSummary};
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome of a run.
    pub fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_summary_json(summary),
            OutputFormat::Table => Ok(self.format_summary_table(summary)),
        }
    }

    fn format_summary_json(&self, summary: &RunSummary) -> Result<String> {
        let documents: Vec<serde_json::Value> = summary
            .documents
            .iter()
            .map(|d| {
                serde_json::json!({
                    "country": d.country,
                    "document": d.path.display().to_string(),
                    "pages": d.pages,
                    "batches": d.batches,
                    "requests": d.requests,
                    "rules_added": d.rules_added,
                    "skipped": d.skipped,
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&serde_json::json!({
            "documents": documents,
            "rules_by_country": summary.rules_by_country,
            "total_rules": summary.total_rules(),
        }))?)
    }

    fn format_summary_table(&self, summary: &RunSummary) -> String {
        if summary.documents.is_empty() {
            return self.colorize("No documents processed.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Country", "Document", "Pages", "Batches", "Requests", "Rules", "Skipped"]);

        for report in &summary.documents {
            let skipped_pages: usize = report
                .skipped
                .iter()
                .map(|s| s.last_page + 1 - s.first_page)
                .sum();
            builder.push_record([
                report.country.clone(),
                document_name(&report.path),
                report.pages.to_string(),
                report.batches.to_string(),
                report.requests.to_string(),
                report.rules_added.to_string(),
                skipped_pages.to_string(),
            ]);
        }

        let mut out = rounded(builder);
        out.push('\n');

        let skipped = summary.skipped();
        let totals = format!(
            "{} rule(s) from {} document(s) in {} request(s)",
            summary.total_rules(),
            summary.documents.len(),
            summary.requests()
        );
        if skipped.is_empty() {
            out.push_str(&self.success(&totals));
        } else {
            out.push_str(&self.warning(&format!("{}, {} range(s) skipped", totals, skipped.len())));
        }
        out
    }

    /// Format located documents.
    pub fn format_documents(&self, documents: &DocumentMap) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(documents)?),
            OutputFormat::Table => {
                if documents.is_empty() {
                    return Ok(self.colorize("No documents found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Country", "Document"]);
                for (country, paths) in documents {
                    for path in paths {
                        builder.push_record([country.clone(), path.display().to_string()]);
                    }
                }
                Ok(rounded(builder))
            }
        }
    }

    /// Format the batch plan of one document.
    pub fn format_plan(&self, document: &Path, plan: &[PlannedBatch]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(plan)?),
            OutputFormat::Table => {
                if plan.is_empty() {
                    return Ok(self.colorize("Document has no pages.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Batch", "Pages", "Words", "Note"]);
                for (i, batch) in plan.iter().enumerate() {
                    let pages = if batch.first_page == batch.last_page {
                        batch.first_page.to_string()
                    } else {
                        format!("{}-{}", batch.first_page, batch.last_page)
                    };
                    let note = if batch.oversized {
                        "page exceeds budget, skipped"
                    } else {
                        ""
                    };
                    builder.push_record([(i + 1).to_string(), pages, batch.words.to_string(), note.to_string()]);
                }

                let mut out = rounded(builder);
                out.push('\n');
                out.push_str(&self.info(&format!(
                    "{}: {} request(s) needed",
                    document.display(),
                    plan.iter().filter(|b| !b.oversized).count()
                )));
                Ok(out)
            }
        }
    }

    /// Format a rule collection, optionally limited to one country.
    pub fn format_collection(&self, rules: &RuleCollection, country: Option<&str>) -> Result<String> {
        match (self.format, country) {
            (OutputFormat::Json, None) => Ok(serde_json::to_string_pretty(rules)?),
            (OutputFormat::Json, Some(code)) => Ok(serde_json::to_string_pretty(rules.rules(code))?),
            (OutputFormat::Table, None) => {
                if rules.is_empty() {
                    return Ok(self.colorize("No countries in collection.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Country", "Rules", "Documents"]);
                for (code, list) in rules.iter() {
                    let mut docs: Vec<&str> = list.iter().map(|r| r.from_doc.as_str()).collect();
                    docs.sort_unstable();
                    docs.dedup();
                    builder.push_record([code.to_string(), list.len().to_string(), docs.len().to_string()]);
                }

                let mut out = rounded(builder);
                out.push('\n');
                out.push_str(&self.info(&format!("{} rule(s) total", rules.total_rules())));
                Ok(out)
            }
            (OutputFormat::Table, Some(code)) => {
                let list = rules.rules(code);
                if list.is_empty() {
                    return Ok(self.colorize(&format!("No rules for {}.", code), "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Rule", "Content", "Source"]);
                for rule in list {
                    builder.push_record([rule.rule_name.clone(), truncate(&rule.rule_content, 80), rule.from_doc.clone()]);
                }
                Ok(rounded(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn rounded(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyberpolicy_domain::PolicyRule;
    use cyberpolicy_extractor::{BatchFailure, DocumentReport, SkippedRange};
    use std::path::PathBuf;

    fn rule(name: &str, doc: &str) -> PolicyRule {
        PolicyRule {
            country_code: "US".to_string(),
            rule_name: name.to_string(),
            rule_content: "Accessing a computer without authorization".to_string(),
            additional_info: String::new(),
            from_doc: doc.to_string(),
        }
    }

    fn summary() -> RunSummary {
        let mut summary = RunSummary::default();
        summary.documents.push(DocumentReport {
            country: "US".to_string(),
            path: PathBuf::from("policies/US/cfaa.pdf"),
            pages: 12,
            cursor: 12,
            batches: 3,
            requests: 4,
            rules_added: 7,
            skipped: vec![SkippedRange {
                country: "US".to_string(),
                document: PathBuf::from("policies/US/cfaa.pdf"),
                first_page: 5,
                last_page: 6,
                reason: BatchFailure::RequestFailed {
                    reason: "timeout".to_string(),
                },
            }],
        });
        summary.rules_by_country.insert("US".to_string(), 7);
        summary
    }

    #[test]
    fn test_summary_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_summary(&summary()).unwrap();
        assert!(output.contains("cfaa.pdf"));
        assert!(output.contains("Requests"));
        assert!(output.contains("⚠ 7 rule(s) from 1 document(s) in 4 request(s), 1 range(s) skipped"));
    }

    #[test]
    fn test_summary_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_summary(&summary()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["total_rules"], 7);
        assert_eq!(value["documents"][0]["skipped"][0]["reason"]["kind"], "request_failed");
    }

    #[test]
    fn test_empty_summary() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_summary(&RunSummary::default()).unwrap();
        assert!(output.contains("No documents processed"));
    }

    #[test]
    fn test_documents_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut documents = DocumentMap::new();
        documents.insert("EU".to_string(), vec![PathBuf::from("policies/EU/nis2.pdf")]);
        let output = formatter.format_documents(&documents).unwrap();
        assert!(output.contains("EU"));
        assert!(output.contains("nis2.pdf"));
    }

    #[test]
    fn test_plan_table_marks_oversized_pages() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let plan = vec![
            PlannedBatch {
                first_page: 1,
                last_page: 2,
                words: 900,
                oversized: false,
            },
            PlannedBatch {
                first_page: 3,
                last_page: 3,
                words: 5000,
                oversized: true,
            },
        ];
        let output = formatter.format_plan(Path::new("act.pdf"), &plan).unwrap();
        assert!(output.contains("1-2"));
        assert!(output.contains("skipped"));
        assert!(output.contains("act.pdf: 1 request(s) needed"));
    }

    #[test]
    fn test_collection_table_counts_documents() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut rules = RuleCollection::new();
        rules.append("US", vec![rule("A", "a.pdf"), rule("B", "a.pdf"), rule("C", "b.pdf")]);
        rules.ensure_country("FR");

        let output = formatter.format_collection(&rules, None).unwrap();
        assert!(output.contains("FR"));
        assert!(output.contains("3 rule(s) total"));
    }

    #[test]
    fn test_collection_for_unknown_country() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_collection(&RuleCollection::new(), Some("ZZ")).unwrap();
        assert_eq!(output, "No rules for ZZ.");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
