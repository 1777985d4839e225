use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The primitive type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// UTF-8 string.
    String,
    /// Floating-point number.
    Number,
    /// Whole number.
    Integer,
    /// true/false.
    Boolean,
    /// Nested object with named properties.
    Object,
    /// Homogeneous list.
    Array,
    /// Unconstrained value.
    Any,
}

/// One node in the schema tree.
///
/// Immutable once produced: fragments are normalized into this form and then
/// combined with [`merge`](super::merge), never edited in place. Properties
/// are kept in a `BTreeMap` so the merged schema (and everything generated
/// from it) is deterministic regardless of contribution arrival order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Field type, if declared or inferable.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<SchemaType>,

    /// Default value applied when the configuration omits this field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Human-readable description, surfaced in generated types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Named child descriptors for object nodes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaDefinition>,

    /// Element descriptor for array nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaDefinition>>,

    /// Whether keys beyond `properties` are accepted. Set for fragments
    /// adapted from Standard Schemas, where the real shape is opaque.
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<bool>,
}

/// Keys that mark an object as an explicit field descriptor rather than a
/// plain nested value.
const DESCRIPTOR_KEYS: [&str; 6] = [
    "type",
    "default",
    "description",
    "properties",
    "items",
    "additionalProperties",
];

impl SchemaDefinition {
    /// Normalizes loosely authored schema input into a descriptor tree.
    ///
    /// Accepts both explicit descriptor objects (any reserved descriptor key
    /// present) and plain values: a plain scalar becomes a leaf with an
    /// inferred type and that scalar as default, a plain object becomes an
    /// object descriptor with each entry resolved recursively.
    pub fn resolve(raw: &Value) -> SchemaDefinition {
        match raw {
            Value::Object(map) => {
                if map.keys().any(|k| DESCRIPTOR_KEYS.contains(&k.as_str())) {
                    Self::resolve_descriptor(map)
                } else {
                    SchemaDefinition {
                        ty: Some(SchemaType::Object),
                        properties: map
                            .iter()
                            .map(|(key, value)| (key.clone(), Self::resolve(value)))
                            .collect(),
                        ..SchemaDefinition::default()
                    }
                }
            }
            value => SchemaDefinition {
                ty: Some(Self::infer_type(value)),
                default: Some(value.clone()),
                items: Self::infer_items(value),
                ..SchemaDefinition::default()
            },
        }
    }

    /// Creates an object descriptor from named child descriptors.
    pub fn object(properties: BTreeMap<String, SchemaDefinition>) -> SchemaDefinition {
        SchemaDefinition {
            ty: Some(SchemaType::Object),
            properties,
            ..SchemaDefinition::default()
        }
    }

    /// Creates an open object descriptor that accepts arbitrary keys.
    pub fn open_object(description: impl Into<String>) -> SchemaDefinition {
        SchemaDefinition {
            ty: Some(SchemaType::Object),
            description: Some(description.into()),
            additional_properties: Some(true),
            ..SchemaDefinition::default()
        }
    }

    /// Returns true if this node declares no shape information at all.
    pub fn is_unconstrained(&self) -> bool {
        self.additional_properties == Some(true)
            || (self.ty.is_none() && self.properties.is_empty() && self.items.is_none())
    }

    fn resolve_descriptor(map: &serde_json::Map<String, Value>) -> SchemaDefinition {
        let default = map.get("default").cloned();

        let ty = map
            .get("type")
            .and_then(|t| serde_json::from_value::<SchemaType>(t.clone()).ok())
            .or_else(|| default.as_ref().map(Self::infer_type));

        let properties = map
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(key, value)| (key.clone(), Self::resolve(value)))
                    .collect()
            })
            .unwrap_or_default();

        let items = map
            .get("items")
            .map(|items| Box::new(Self::resolve(items)))
            .or_else(|| default.as_ref().and_then(Self::infer_items));

        SchemaDefinition {
            ty,
            default,
            description: map
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_owned),
            properties,
            items,
            additional_properties: map.get("additionalProperties").and_then(Value::as_bool),
        }
    }

    fn infer_type(value: &Value) -> SchemaType {
        match value {
            Value::String(_) => SchemaType::String,
            Value::Bool(_) => SchemaType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => SchemaType::Integer,
            Value::Number(_) => SchemaType::Number,
            Value::Array(_) => SchemaType::Array,
            Value::Object(_) => SchemaType::Object,
            Value::Null => SchemaType::Any,
        }
    }

    fn infer_items(value: &Value) -> Option<Box<SchemaDefinition>> {
        let first = value.as_array()?.first()?;
        Some(Box::new(SchemaDefinition {
            ty: Some(Self::infer_type(first)),
            ..SchemaDefinition::default()
        }))
    }
}
