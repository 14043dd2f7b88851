//! Parameter schema derivation for tool declarations.
//!
//! Function-calling APIs accept a plain JSON Schema object for tool
//! parameters but reject (or choke on) cross-referenced subschemas, dialect
//! tags and strict `additionalProperties` flags. Schemas here are generated
//! with every subschema inlined and then stripped of those keys.

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::{json, Map, Value};

/// Derive the provider-facing parameter schema for `T`.
pub fn derive_schema<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();

    // A RootSchema is plain data and always serializes.
    let mut schema = serde_json::to_value(root).unwrap_or_else(|_| json!({ "type": "object" }));

    if let Value::Object(map) = &mut schema {
        map.remove("$schema");
        map.remove("title");
        if map
            .get("definitions")
            .and_then(Value::as_object)
            .is_some_and(Map::is_empty)
        {
            map.remove("definitions");
        }
    }
    allow_additional_properties(&mut schema);
    schema
}

/// Drop every `additionalProperties: false`, at any depth.
fn allow_additional_properties(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("additionalProperties") == Some(&Value::Bool(false)) {
                map.remove("additionalProperties");
            }
            for child in map.values_mut() {
                allow_additional_properties(child);
            }
        }
        Value::Array(items) => {
            for child in items {
                allow_additional_properties(child);
            }
        }
        _ => {}
    }
}
