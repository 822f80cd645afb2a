//! Structured payloads embedded in model output.

pub mod extract;
pub mod schema;

pub use extract::{extract_array, extract_object};
pub use schema::{Schema, SchemaIssue, Shape};

use serde_json::{Map, Value};

/// Extract and validate in one step.
pub fn extract_validated(text: &str, schema: &Schema) -> Result<Map<String, Value>, Vec<SchemaIssue>> {
    let value = extract_object(text).ok_or_else(|| vec![SchemaIssue::NoPayload])?;
    schema.validate(value)
}
