//! Builders for Gemini response schemas (OpenAPI subset, upper-case type names).

use serde_json::{json, Map, Value};

pub fn string() -> Value {
    json!({ "type": "STRING" })
}

pub fn integer() -> Value {
    json!({ "type": "INTEGER" })
}

pub fn array(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

pub fn object(properties: &[(&str, Value)]) -> Value {
    let properties: Map<String, Value> = properties
        .iter()
        .map(|(name, schema)| (name.to_string(), schema.clone()))
        .collect();
    json!({ "type": "OBJECT", "properties": properties })
}

/// Attaches a `description` hint to a schema node.
pub fn described(mut schema: Value, description: &str) -> Value {
    if let Value::Object(map) = &mut schema {
        map.insert("description".into(), Value::String(description.into()));
    }
    schema
}
