use super::SchemaDefinition;

/// Deep-merges two schema definitions with the overlay taking precedence.
///
/// Object properties are unioned key-wise and merged recursively; every other
/// field (type, default, description, items, open-object marker) is replaced
/// by the overlay when it declares a value. Arrays and scalars are never
/// element-merged. Merging a definition with itself yields that definition.
pub fn merge(base: SchemaDefinition, overlay: SchemaDefinition) -> SchemaDefinition {
    let mut properties = base.properties;

    for (key, overlay_value) in overlay.properties {
        match properties.remove(&key) {
            None => {
                properties.insert(key, overlay_value);
            }
            Some(base_value) => {
                properties.insert(key, merge(base_value, overlay_value));
            }
        }
    }

    SchemaDefinition {
        ty: overlay.ty.or(base.ty),
        default: overlay.default.or(base.default),
        description: overlay.description.or(base.description),
        properties,
        items: overlay.items.or(base.items),
        additional_properties: overlay.additional_properties.or(base.additional_properties),
    }
}

/// Folds an ordered sequence of fragments into one definition.
///
/// Fragments are merged in registration order, so a later fragment's leaf
/// values win over earlier ones.
pub fn merge_all(fragments: impl IntoIterator<Item = SchemaDefinition>) -> SchemaDefinition {
    fragments
        .into_iter()
        .fold(SchemaDefinition::default(), merge)
}
