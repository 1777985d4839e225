use schemars::{JsonSchema, schema_for};
use serde_json::Value;

use super::{SchemaDefinition, SchemaType};
use crate::error::{Result, SchemaError};

/// Converts a JSON Schema document into a schema fragment.
///
/// Understands the subset `schemars` emits for configuration structs:
/// `type`, `description`, `default`, `properties`, `items`, and
/// `additionalProperties`. Anything it cannot interpret degrades to an
/// unconstrained node rather than being rejected.
pub fn from_json_schema(schema: &Value) -> SchemaDefinition {
    let Some(map) = schema.as_object() else {
        return SchemaDefinition::default();
    };

    let properties = map
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(key, value)| (key.clone(), from_json_schema(value)))
                .collect()
        })
        .unwrap_or_default();

    SchemaDefinition {
        ty: map.get("type").and_then(declared_type),
        default: map.get("default").cloned(),
        description: map
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_owned),
        properties,
        items: map
            .get("items")
            .map(|items| Box::new(from_json_schema(items))),
        additional_properties: map.get("additionalProperties").and_then(Value::as_bool),
    }
}

/// Builds a schema fragment from a Rust configuration type.
///
/// Lets framework modules contribute their config shape with a
/// `#[derive(JsonSchema)]` struct instead of hand-writing descriptors.
///
/// # Errors
///
/// Returns `SchemaError::Serialization` if the generated schema cannot be
/// converted to a JSON value (not expected for valid `schemars` output).
pub fn fragment_of<T: JsonSchema>() -> Result<SchemaDefinition> {
    let schema = serde_json::to_value(schema_for!(T)).map_err(|e| SchemaError::Serialization {
        content_type: "generated JSON Schema".to_string(),
        details: e.to_string(),
    })?;

    Ok(from_json_schema(&schema))
}

/// Maps a JSON Schema `type` keyword to a [`SchemaType`]. Union types take
/// the first non-null member.
fn declared_type(keyword: &Value) -> Option<SchemaType> {
    let name = match keyword {
        Value::String(s) => Some(s.as_str()),
        Value::Array(variants) => variants
            .iter()
            .filter_map(Value::as_str)
            .find(|s| *s != "null"),
        _ => None,
    }?;

    match name {
        "string" => Some(SchemaType::String),
        "number" => Some(SchemaType::Number),
        "integer" => Some(SchemaType::Integer),
        "boolean" => Some(SchemaType::Boolean),
        "object" => Some(SchemaType::Object),
        "array" => Some(SchemaType::Array),
        _ => Some(SchemaType::Any),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Serialize, Deserialize, JsonSchema)]
    struct CacheConfig {
        /// Maximum entries kept in memory.
        max_entries: u32,
        /// Whether the cache persists across restarts.
        persistent: bool,
    }

    #[test]
    fn json_schema_properties_map_to_descriptors() {
        let schema = json!({
            "type": "object",
            "properties": {
                "endpoint": { "type": "string", "description": "API endpoint" },
                "timeout": { "type": "integer", "default": 1000 }
            }
        });

        let def = from_json_schema(&schema);

        assert_eq!(def.ty, Some(SchemaType::Object));
        assert_eq!(def.properties["endpoint"].ty, Some(SchemaType::String));
        assert_eq!(def.properties["timeout"].default, Some(json!(1000)));
    }

    #[test]
    fn nullable_union_types_use_inner_type() {
        let schema = json!({ "type": ["string", "null"] });
        assert_eq!(from_json_schema(&schema).ty, Some(SchemaType::String));
    }

    #[test]
    fn fragment_of_derives_from_rust_type() {
        let def = fragment_of::<CacheConfig>().unwrap();

        assert_eq!(def.ty, Some(SchemaType::Object));
        assert_eq!(
            def.properties["max_entries"].ty,
            Some(SchemaType::Integer)
        );
        assert_eq!(def.properties["persistent"].ty, Some(SchemaType::Boolean));
    }

    #[test]
    fn non_object_input_degrades_to_unconstrained() {
        assert!(from_json_schema(&json!(true)).is_unconstrained());
    }
}
