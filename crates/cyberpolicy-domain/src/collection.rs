//! RuleCollection - the country-keyed, append-only result of a run

use crate::rule::PolicyRule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Country code → rules, in processing order
///
/// The collection only ever grows: rules are appended, never replaced,
/// merged or deduplicated. It serializes as a plain JSON object keyed by
/// country code, which is also the shape of the output artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleCollection {
    by_country: BTreeMap<String, Vec<PolicyRule>>,
}

impl RuleCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a country has an entry, even if no rules are ever found for it
    pub fn ensure_country(&mut self, country: &str) {
        self.by_country.entry(country.to_string()).or_default();
    }

    /// Append rules to a country's entry, returning how many were added
    pub fn append(&mut self, country: &str, rules: Vec<PolicyRule>) -> usize {
        let added = rules.len();
        self.by_country
            .entry(country.to_string())
            .or_default()
            .extend(rules);
        added
    }

    /// Rules recorded for a country (empty if the country is unknown)
    pub fn rules(&self, country: &str) -> &[PolicyRule] {
        self.by_country
            .get(country)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of rules recorded for a country
    pub fn count(&self, country: &str) -> usize {
        self.rules(country).len()
    }

    /// Country codes present in the collection, in sorted order
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.by_country.keys().map(String::as_str)
    }

    /// Iterate over `(country, rules)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PolicyRule])> {
        self.by_country
            .iter()
            .map(|(country, rules)| (country.as_str(), rules.as_slice()))
    }

    /// Total number of rules across all countries
    pub fn total_rules(&self) -> usize {
        self.by_country.values().map(Vec::len).sum()
    }

    /// Whether no country has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.by_country.is_empty()
    }
}
