//! Corrective prompt for a structured reply that failed validation.

use crate::structured::{Schema, SchemaIssue};

/// Template for repair cycles
pub struct RepairPrompt;

impl RepairPrompt {
    pub fn repair(schema: &Schema, previous_output: &str, issues: &[SchemaIssue]) -> String {
        let problems = issues
            .iter()
            .map(|i| format!("- {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            r#"Your previous answer was supposed to be a JSON {name} but it could not be used.

Your previous answer:
<<<
{previous_output}
>>>

Problems found:
{problems}

The JSON object must contain these keys:
{keys}

Reply again with the corrected JSON object only. Keep the content of your previous answer where it was valid."#,
            name = schema.name(),
            previous_output = previous_output.trim(),
            keys = schema.describe(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structured::Shape;

    #[test]
    fn test_repair_prompt_lists_issues_and_keys() {
        let schema = Schema::new("abc").require("c", Shape::Array);
        let prompt = RepairPrompt::repair(
            &schema,
            "{\"a\": 1}",
            &[SchemaIssue::Missing { key: "c".into() }],
        );
        assert!(prompt.contains("JSON abc"));
        assert!(prompt.contains("- required key \"c\" is missing"));
        assert!(prompt.contains("- \"c\" (array)"));
        assert!(prompt.contains("{\"a\": 1}"));
    }
}
