//! PolicyRule - the unit of extracted output

use serde::{Deserialize, Serialize};

/// One cybercrime-related policy rule extracted from a source document
///
/// Rules are created by the accumulator once a model response has been
/// parsed, and are never mutated afterwards. `from_doc` is always assigned
/// by the pipeline from the source file name, never taken from the model.
///
/// # Examples
///
/// ```
/// use cyberpolicy_domain::PolicyRule;
///
/// let rule = PolicyRule {
///     country_code: "US".to_string(),
///     rule_name: "Preventing DDoS attacks".to_string(),
///     rule_content: "DDoS attacks are illegal".to_string(),
///     additional_info: "Fines and prison time".to_string(),
///     from_doc: "cfaa.pdf".to_string(),
/// };
/// assert!(rule.is_tagged());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// 2-letter country code, or the code of a supranational body (e.g. `EU`)
    pub country_code: String,

    /// Short label for the rule
    pub rule_name: String,

    /// Normative text of the rule, in English
    pub rule_content: String,

    /// Penalties, scope, exceptions and other context
    pub additional_info: String,

    /// Base filename of the document the rule came from
    pub from_doc: String,
}

impl PolicyRule {
    /// Whether the rule carries its source document
    pub fn is_tagged(&self) -> bool {
        !self.from_doc.is_empty()
    }
}
