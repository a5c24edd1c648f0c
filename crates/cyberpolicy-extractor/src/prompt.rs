//! LLM prompt engineering for policy rule extraction

/// Key of the rule array in the model's JSON response
pub const RULES_KEY: &str = "cybercrime_related_policy_rules";

/// System instruction sent with every extraction request
pub const SYSTEM_PROMPT: &str =
    "You are an expert in cybercrimes and global government policy-making.";

/// Builds the user prompt for one batch of pages
pub struct PromptBuilder {
    country_code: String,
    batch_text: String,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(country_code: impl Into<String>, batch_text: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            batch_text: batch_text.into(),
        }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "Please extract policy rules from the following policy documentation published by {} \
             (2-letter country code, EU means European Union). \
             Each page is marked with '=== PAGE X ===':\n\n",
            self.country_code
        ));

        prompt.push_str(&self.batch_text);
        prompt.push_str("\n\n");

        prompt.push_str(EXTRACTION_RULES);
        prompt.push_str("\n\n");
        prompt.push_str(RESPONSE_EXAMPLE);
        prompt.push('\n');

        prompt
    }
}

const EXTRACTION_RULES: &str = r#"Please follow these rules when summarizing:
- If the text is not English, translate it to English before summarizing.
- Only include rules related to cybercrime and the prevention, punishment and investigation of cybercrimes. If no cybercrime related policy rules are found, return an empty cybercrime_related_policy_rules array.
- Do not omit any important information.
- If a policy rule covers multiple areas, split it into multiple rules.
- If the given country is EU, use EU as country_code in the response.
- Respond in JSON following this example:"#;

const RESPONSE_EXAMPLE: &str = r#"{
  "cybercrime_related_policy_rules": [
    {
      "country_code": "US",
      "rule_name": "Preventing DDoS attacks",
      "rule_content": "DDoS attacks are illegal and will be prosecuted",
      "additional_info": "The punishment for a DDoS attack can include a fine, prison time, and seizure of electronic devices. The severity of the punishment depends on the nature of the attack and the damage caused."
    }
  ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_country() {
        let prompt = PromptBuilder::new("JP", "text").build();
        assert!(prompt.contains("published by JP"));
    }

    #[test]
    fn test_prompt_includes_batch_text() {
        let prompt = PromptBuilder::new("US", "\n=== PAGE 1 ===\nComputer Fraud and Abuse Act").build();
        assert!(prompt.contains("=== PAGE 1 ===\nComputer Fraud and Abuse Act"));
    }

    #[test]
    fn test_prompt_includes_instructions() {
        let prompt = PromptBuilder::new("EU", "text").build();
        assert!(prompt.contains("translate it to English"));
        assert!(prompt.contains("Only include rules related to cybercrime"));
        assert!(prompt.contains("split it into multiple rules"));
        assert!(prompt.contains("use EU as country_code"));
    }

    #[test]
    fn test_response_example_is_valid_json() {
        let example: serde_json::Value = serde_json::from_str(RESPONSE_EXAMPLE).unwrap();
        let rules = example[RULES_KEY].as_array().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_prompt_embeds_example() {
        let prompt = PromptBuilder::new("US", "text").build();
        assert!(prompt.contains(RULES_KEY));
        assert!(prompt.contains("Preventing DDoS attacks"));
    }
}
