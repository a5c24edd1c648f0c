//! Parse model responses into rules and merge them into the collection

use crate::prompt::RULES_KEY;
use crate::types::{BatchFailure, ExtractionResponse, RuleCandidate};
use cyberpolicy_domain::{PolicyRule, RuleCollection};
use serde_json::Value;
use tracing::{debug, warn};

/// Parse a model response into rules tagged with their source document
///
/// Textual responses have code fences stripped before parsing; structured
/// responses are used as they are. Array elements that are not objects, or
/// that have neither a name nor content, are dropped with a warning; field
/// values that are not strings are kept as their JSON text.
///
/// # Errors
///
/// - `RequestFailed` for a [`ExtractionResponse::Failed`] response
/// - `MalformedResponse` if the payload is not JSON, not an object, or has
///   no rule array under the expected key
pub fn parse_rules(
    response: &ExtractionResponse,
    from_doc: &str,
    country: &str,
) -> Result<Vec<PolicyRule>, BatchFailure> {
    match response {
        ExtractionResponse::Text(text) => {
            let value = parse_json_payload(text)?;
            rules_from_value(&value, from_doc, country)
        }
        ExtractionResponse::Structured(value) => rules_from_value(value, from_doc, country),
        ExtractionResponse::Failed(reason) => Err(BatchFailure::RequestFailed {
            reason: reason.clone(),
        }),
    }
}

/// Parse a response and append its rules to the country's entry
///
/// The collection is only touched when parsing succeeds.
pub fn accumulate(
    collection: &mut RuleCollection,
    country: &str,
    from_doc: &str,
    response: &ExtractionResponse,
) -> Result<usize, BatchFailure> {
    let rules = parse_rules(response, from_doc, country)?;
    let added = collection.append(country, rules);
    debug!(
        "Appended {} rules to {} (now {})",
        added,
        country,
        collection.count(country)
    );
    Ok(added)
}

/// Strip code fences and parse the remaining text as JSON
fn parse_json_payload(text: &str) -> Result<Value, BatchFailure> {
    let stripped = strip_code_fences(text);

    match serde_json::from_str::<Value>(&stripped) {
        Ok(value) => Ok(value),
        Err(first_error) => {
            // Models sometimes wrap the object in prose
            let start = stripped.find('{');
            let end = stripped.rfind('}');
            match (start, end) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str(&stripped[start..=end]).map_err(|_| malformed(first_error))
                }
                _ => Err(malformed(first_error)),
            }
        }
    }
}

fn malformed(error: serde_json::Error) -> BatchFailure {
    BatchFailure::MalformedResponse {
        reason: format!("JSON parse error: {}", error),
    }
}

/// Remove markdown code fence markers wherever they occur
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

fn rules_from_value(value: &Value, from_doc: &str, country: &str) -> Result<Vec<PolicyRule>, BatchFailure> {
    let object = value.as_object().ok_or_else(|| BatchFailure::MalformedResponse {
        reason: "Expected a JSON object".to_string(),
    })?;

    let items = object
        .get(RULES_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| BatchFailure::MalformedResponse {
            reason: format!("Missing '{}' array", RULES_KEY),
        })?;

    let mut rules = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        if !item.is_object() {
            warn!("Rule {} from {} is not a JSON object, skipping", idx, from_doc);
            continue;
        }
        match serde_json::from_value::<RuleCandidate>(item.clone()) {
            Ok(candidate) if candidate.is_blank() => {
                warn!("Rule {} from {} has no name or content, skipping", idx, from_doc);
            }
            Ok(candidate) => rules.push(candidate.into_rule(from_doc, country)),
            Err(e) => warn!("Failed to parse rule {} from {}: {}", idx, from_doc, e),
        }
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WELL_FORMED: &str = r#"{"cybercrime_related_policy_rules": [
        {"country_code": "US", "rule_name": "X", "rule_content": "Y", "additional_info": "Z"}
    ]}"#;

    fn text(s: &str) -> ExtractionResponse {
        ExtractionResponse::Text(s.to_string())
    }

    #[test]
    fn test_parse_well_formed_text() {
        let rules = parse_rules(&text(WELL_FORMED), "act.pdf", "US").unwrap();
        assert_eq!(
            rules,
            vec![PolicyRule {
                country_code: "US".to_string(),
                rule_name: "X".to_string(),
                rule_content: "Y".to_string(),
                additional_info: "Z".to_string(),
                from_doc: "act.pdf".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_with_markdown_wrapper() {
        let wrapped = format!("```json\n{}\n```", WELL_FORMED);
        let rules = parse_rules(&text(&wrapped), "act.pdf", "US").unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_parse_with_surrounding_prose() {
        let chatty = format!("Here are the rules:\n{}\nLet me know if you need more.", WELL_FORMED);
        let rules = parse_rules(&text(&chatty), "act.pdf", "US").unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_non_json_is_malformed() {
        let result = parse_rules(&text("This is not JSON"), "act.pdf", "US");
        assert!(matches!(result, Err(BatchFailure::MalformedResponse { .. })));
    }

    #[test]
    fn test_missing_key_is_malformed() {
        let result = parse_rules(&text(r#"{"rules": []}"#), "act.pdf", "US");
        assert!(matches!(result, Err(BatchFailure::MalformedResponse { .. })));
    }

    #[test]
    fn test_top_level_array_is_malformed() {
        let result = parse_rules(&text("[]"), "act.pdf", "US");
        assert!(matches!(result, Err(BatchFailure::MalformedResponse { .. })));
    }

    #[test]
    fn test_failed_response_is_request_failure() {
        let result = parse_rules(&ExtractionResponse::Failed("timeout".into()), "act.pdf", "US");
        assert_eq!(
            result,
            Err(BatchFailure::RequestFailed {
                reason: "timeout".to_string()
            })
        );
    }

    #[test]
    fn test_resilience_never_panics() {
        for junk in ["garbage", r#"{"other": 1}"#, "{", "null", r#"{"cybercrime_related_policy_rules": 7}"#] {
            assert!(parse_rules(&text(junk), "a.pdf", "US").unwrap_or_default().is_empty());
        }
        assert_eq!(parse_rules(&text(WELL_FORMED), "a.pdf", "US").unwrap().len(), 1);
    }

    #[test]
    fn test_null_and_list_fields_keep_the_rule() {
        let response = text(
            r#"{"cybercrime_related_policy_rules": [
                {"country_code": "US", "rule_name": "Wire fraud", "rule_content": "Prohibited", "additional_info": null},
                {"country_code": "US", "rule_name": "Identity theft", "rule_content": "Prohibited", "additional_info": ["fine", "prison"]}
            ]}"#,
        );
        let rules = parse_rules(&response, "doc.pdf", "US").unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].additional_info, "");
        assert_eq!(rules[1].additional_info, r#"["fine","prison"]"#);
        assert!(rules.iter().all(|r| r.from_doc == "doc.pdf"));
    }

    #[test]
    fn test_structured_response_is_tagged() {
        let response = ExtractionResponse::Structured(json!({
            "cybercrime_related_policy_rules": [
                {"country_code": "EU", "rule_name": "NIS2", "rule_content": "Report incidents", "additional_info": ""}
            ]
        }));
        let rules = parse_rules(&response, "nis2.pdf", "EU").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].from_doc, "nis2.pdf");
    }

    #[test]
    fn test_model_supplied_from_doc_is_overwritten() {
        let response = text(
            r#"{"cybercrime_related_policy_rules": [
                {"country_code": "US", "rule_name": "X", "rule_content": "Y", "additional_info": "Z", "from_doc": "wrong.pdf"}
            ]}"#,
        );
        let rules = parse_rules(&response, "right.pdf", "US").unwrap();
        assert_eq!(rules[0].from_doc, "right.pdf");
    }

    #[test]
    fn test_partial_success() {
        let response = text(
            r#"{"cybercrime_related_policy_rules": [
                {"rule_name": "A", "rule_content": "first"},
                "not an object",
                {"rule_name": 42, "rule_content": "bad type"},
                {},
                {"country_code": "CA", "rule_name": "B", "rule_content": "second"}
            ]}"#,
        );
        let rules = parse_rules(&response, "doc.pdf", "US").unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].country_code, "US");
        assert_eq!(rules[0].additional_info, "");
        assert_eq!(rules[1].rule_name, "42");
        assert_eq!(rules[2].country_code, "CA");
    }

    #[test]
    fn test_empty_rule_array() {
        let rules = parse_rules(&text(r#"{"cybercrime_related_policy_rules": []}"#), "a.pdf", "US").unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_accumulate_appends() {
        let mut collection = RuleCollection::new();
        accumulate(&mut collection, "US", "a.pdf", &text(WELL_FORMED)).unwrap();
        accumulate(&mut collection, "US", "b.pdf", &text(WELL_FORMED)).unwrap();

        let docs: Vec<_> = collection.rules("US").iter().map(|r| r.from_doc.as_str()).collect();
        assert_eq!(docs, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_accumulate_leaves_collection_untouched_on_failure() {
        let mut collection = RuleCollection::new();
        collection.append("US", parse_rules(&text(WELL_FORMED), "a.pdf", "US").unwrap());
        let before = collection.clone();

        assert!(accumulate(&mut collection, "US", "b.pdf", &text("nope")).is_err());
        assert!(accumulate(&mut collection, "US", "b.pdf", &ExtractionResponse::Failed("x".into())).is_err());
        assert_eq!(collection, before);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }
}
