//! Required-key schemas for structured model output.

use serde_json::{Map, Number, Value};
use std::fmt;

/// Basic type shape a required key must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Any,
}

impl Shape {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Shape::String => value.is_string(),
            Shape::Number => value.is_number(),
            Shape::Boolean => value.is_boolean(),
            Shape::Array => value.is_array(),
            Shape::Object => value.is_object(),
            Shape::Any => !value.is_null(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::String => "string",
            Shape::Number => "number",
            Shape::Boolean => "boolean",
            Shape::Array => "array",
            Shape::Object => "object",
            Shape::Any => "any non-null value",
        }
    }
}

/// Name of the JSON type of `value`, for issue messages.
pub fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub shape: Shape,
    /// Inclusive bounds; well-formed numbers outside are clamped.
    pub range: Option<(f64, f64)>,
}

/// One reason a payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaIssue {
    NoPayload,
    NotAnObject { found: &'static str },
    Missing { key: String },
    WrongShape {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    Malformed { detail: String },
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaIssue::NoPayload => write!(f, "no JSON object could be found in the response"),
            SchemaIssue::NotAnObject { found } => {
                write!(f, "expected a JSON object but found {found}")
            }
            SchemaIssue::Missing { key } => write!(f, "required key \"{key}\" is missing"),
            SchemaIssue::WrongShape {
                key,
                expected,
                found,
            } => write!(f, "key \"{key}\" must be {expected} but was {found}"),
            SchemaIssue::Malformed { detail } => write!(f, "payload is malformed: {detail}"),
        }
    }
}

/// Ordered list of required keys with their shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn require(mut self, key: impl Into<String>, shape: Shape) -> Self {
        self.fields.push(FieldSpec {
            name: key.into(),
            shape,
            range: None,
        });
        self
    }

    pub fn require_number_in(mut self, key: impl Into<String>, min: f64, max: f64) -> Self {
        self.fields.push(FieldSpec {
            name: key.into(),
            shape: Shape::Number,
            range: Some((min, max)),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn project_plan() -> Self {
        Schema::new("project plan")
            .require("project_name", Shape::String)
            .require("objectives", Shape::Array)
            .require("timeline", Shape::Object)
    }

    pub fn progress_report() -> Self {
        Schema::new("progress report")
            .require("round", Shape::Number)
            .require("total_rounds", Shape::Number)
            .require_number_in("completion_percentage", 0.0, 100.0)
            .require("objectives_status", Shape::Object)
            .require("timeline_status", Shape::Object)
    }

    pub fn plan_adjustment() -> Self {
        Schema::new("plan adjustment")
            .require("modified_objectives", Shape::Array)
            .require("timeline_adjustments", Shape::Array)
            .require("resource_adjustments", Shape::Array)
            .require("risk_adjustments", Shape::Array)
    }

    pub fn team_member() -> Self {
        Schema::new("team member")
            .require("name", Shape::String)
            .require("role", Shape::String)
            .require("prompt", Shape::String)
    }

    /// Validate `value`, returning the accepted object.
    ///
    /// Numeric strings such as `"45"` or `"45%"` are coerced for number keys,
    /// then ranged numbers are clamped. All issues are collected, not just
    /// the first.
    pub fn validate(&self, value: Value) -> Result<Map<String, Value>, Vec<SchemaIssue>> {
        let mut object = match value {
            Value::Object(map) => map,
            other => {
                return Err(vec![SchemaIssue::NotAnObject {
                    found: shape_of(&other),
                }]);
            }
        };

        let mut issues = Vec::new();
        for field in &self.fields {
            let Some(value) = object.get_mut(&field.name) else {
                issues.push(SchemaIssue::Missing {
                    key: field.name.clone(),
                });
                continue;
            };

            if field.shape == Shape::Number
                && let Some(n) = value.as_str().and_then(parse_loose_number)
            {
                *value = number_value(n);
            }

            if !field.shape.matches(value) {
                issues.push(SchemaIssue::WrongShape {
                    key: field.name.clone(),
                    expected: field.shape.name(),
                    found: shape_of(value),
                });
                continue;
            }

            if let Some((min, max)) = field.range
                && let Some(n) = value.as_f64()
                && (n < min || n > max)
            {
                *value = number_value(n.clamp(min, max));
            }
        }

        if issues.is_empty() {
            Ok(object)
        } else {
            Err(issues)
        }
    }

    /// Key list for corrective prompts, e.g. `"round" (number)`.
    pub fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|f| match f.range {
                Some((min, max)) => format!("- \"{}\" ({} between {min} and {max})", f.name, f.shape.name()),
                None => format!("- \"{}\" ({})", f.name, f.shape.name()),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_loose_number(s: &str) -> Option<f64> {
    s.trim().trim_end_matches('%').trim().parse::<f64>().ok()
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn abc() -> Schema {
        Schema::new("abc")
            .require("a", Shape::String)
            .require("b", Shape::Number)
            .require("c", Shape::Array)
    }

    #[test]
    fn test_well_formed_payload_is_unchanged() {
        let payload = json!({"a": "x", "b": 2, "c": [1, 2], "extra": true});
        let accepted = abc().validate(payload.clone()).unwrap();
        assert_eq!(Value::Object(accepted), payload);
    }

    #[test]
    fn test_missing_and_wrong_shape_are_all_reported() {
        let issues = abc().validate(json!({"a": 1, "b": 2})).unwrap_err();
        assert_eq!(
            issues,
            vec![
                SchemaIssue::WrongShape {
                    key: "a".into(),
                    expected: "string",
                    found: "number"
                },
                SchemaIssue::Missing { key: "c".into() },
            ]
        );
    }

    #[test]
    fn test_non_object_rejected() {
        let issues = abc().validate(json!([1, 2])).unwrap_err();
        assert_eq!(issues, vec![SchemaIssue::NotAnObject { found: "array" }]);
    }

    #[test]
    fn test_out_of_range_number_is_clamped() {
        let schema = Schema::new("p").require_number_in("pct", 0.0, 100.0);
        let accepted = schema.validate(json!({"pct": 140.5})).unwrap();
        assert_eq!(accepted["pct"], json!(100));
        let accepted = schema.validate(json!({"pct": -3})).unwrap();
        assert_eq!(accepted["pct"], json!(0));
    }

    #[test]
    fn test_numeric_string_is_coerced() {
        let schema = Schema::new("p").require_number_in("pct", 0.0, 100.0);
        let accepted = schema.validate(json!({"pct": " 45% "})).unwrap();
        assert_eq!(accepted["pct"], json!(45));
        let accepted = schema.validate(json!({"pct": "12.5"})).unwrap();
        assert_eq!(accepted["pct"], json!(12.5));
    }

    #[test]
    fn test_non_numeric_string_is_a_shape_issue() {
        let schema = Schema::new("p").require("n", Shape::Number);
        let issues = schema.validate(json!({"n": "lots"})).unwrap_err();
        assert!(matches!(issues[0], SchemaIssue::WrongShape { .. }));
    }

    #[test]
    fn test_describe_lists_keys() {
        let text = Schema::progress_report().describe();
        assert!(text.contains("\"completion_percentage\" (number between 0 and 100)"));
        assert!(text.contains("\"timeline_status\" (object)"));
    }

    #[test]
    fn test_issue_display() {
        assert_eq!(
            SchemaIssue::Missing { key: "c".into() }.to_string(),
            "required key \"c\" is missing"
        );
    }
}
