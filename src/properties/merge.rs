//! Merging job defaults with manifest overrides.
//!
//! The merge walks each dotted schema name through the override tree. A
//! leaf that is present in the overrides wins, whatever its value (`null`,
//! `false`, `[]` included). A missing leaf receives a copy of the schema
//! default. Keys the schema does not declare are left exactly as the
//! manifest wrote them.

use super::schema::PropertySchema;
use super::{PropertyMap, PropertyValue, ResolvedProperties};

/// Merges `overrides` onto the defaults declared in `schema`.
///
/// The result owns all of its data: defaults are cloned, never shared, so
/// mutating one resolved tree cannot leak into the schema or another render.
///
/// ```
/// use jobrender::properties::{merge, PropertyDefinition, PropertySchema, PropertyValue};
///
/// let schema = PropertySchema::new(vec![PropertyDefinition {
///     name: "syslog.port".to_string(),
///     description: None,
///     default: Some(PropertyValue::Integer(514)),
/// }]);
/// let resolved = merge(&schema, &PropertyValue::empty_mapping());
/// assert_eq!(resolved.get("syslog.port"), Some(&PropertyValue::Integer(514)));
/// ```
#[must_use]
pub fn merge(schema: &PropertySchema, overrides: &PropertyValue) -> ResolvedProperties {
    let mut root = match overrides {
        PropertyValue::Mapping(map) => map.clone(),
        PropertyValue::Null => PropertyMap::new(),
        other => {
            tracing::warn!("Ignoring non-mapping job properties: {}", other);
            PropertyMap::new()
        }
    };

    for definition in schema.iter() {
        let segments: Vec<&str> = definition.name.split('.').collect();
        let default = definition.default.as_ref().unwrap_or(&PropertyValue::Null);
        fill_default(&mut root, &segments, default, &definition.name);
    }

    tracing::debug!("Merged {} schema properties into {} top-level keys", schema.len(), root.len());
    ResolvedProperties::new(root)
}

fn fill_default(map: &mut PropertyMap, segments: &[&str], default: &PropertyValue, name: &str) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() {
        map.entry((*head).to_string()).or_insert_with(|| default.clone());
        return;
    }

    let child = map.entry((*head).to_string()).or_insert_with(PropertyValue::empty_mapping);
    if !matches!(child, PropertyValue::Mapping(_)) {
        tracing::warn!(
            "Property '{}' expects '{}' to be a mapping but found {}; replacing it",
            name,
            head,
            child
        );
        *child = PropertyValue::empty_mapping();
    }

    if let PropertyValue::Mapping(child_map) = child {
        fill_default(child_map, rest, default, name);
    }
}
