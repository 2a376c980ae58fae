//! Tolerant loader for the node declaration feed.
//!
//! The feed is a JSON array produced by the node generator and served to the
//! editor. It is treated as untrusted: entries that cannot be understood are
//! skipped with a warning instead of failing the whole load.

use super::descriptor::{DEFAULT_NODE_COLOR, NodeTypeDescriptor, PortDeclaration, PortMap};
use crate::error::CatalogError;
use crate::port::{PortSpec, PortType};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Parses a declaration feed into descriptors, in feed order.
///
/// Fails only when the document is not JSON or not an array. Duplicate ids are
/// left for the catalog to reject.
pub fn parse_feed(json: &str) -> Result<Vec<NodeTypeDescriptor>, CatalogError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| CatalogError::InvalidFeed(e.to_string()))?;
    let Value::Array(entries) = value else {
        return Err(CatalogError::InvalidFeed(
            "expected a JSON array of node declarations".to_string(),
        ));
    };

    Ok(entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let descriptor = descriptor_from_value(entry);
            if descriptor.is_none() {
                warn!(index, "Skipping malformed node declaration");
            }
            descriptor
        })
        .collect())
}

/// Builds a descriptor from one feed entry. Returns `None` when the entry is
/// not an object or has no string `id`.
pub fn descriptor_from_value(value: &Value) -> Option<NodeTypeDescriptor> {
    let object = value.as_object()?;
    let id = object.get("id")?.as_str()?.to_string();

    let title = string_field(object, "title").unwrap_or_else(|| id.clone());
    let mut descriptor = NodeTypeDescriptor::new(id, title);
    descriptor.description = string_field(object, "description").unwrap_or_default();
    descriptor.category = string_field(object, "category").unwrap_or_default();
    descriptor.color =
        string_field(object, "color").unwrap_or_else(|| DEFAULT_NODE_COLOR.to_string());
    descriptor.icon = string_field(object, "icon").unwrap_or_default();
    descriptor.inputs = ports_from_value(&descriptor.id, object.get("inputs"));
    descriptor.outputs = ports_from_value(&descriptor.id, object.get("outputs"));
    descriptor.default_hardcoded = object
        .get("defaultHardcoded")
        .and_then(Value::as_object)
        .map(|defaults| {
            defaults
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();

    Some(descriptor)
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn ports_from_value(type_id: &str, value: Option<&Value>) -> PortMap {
    let Some(ports) = value.and_then(Value::as_object) else {
        return PortMap::new();
    };

    let mut map = PortMap::new();
    for (key, port) in ports {
        match port_from_value(key, port) {
            Some(declaration) => map.insert(key.clone(), declaration),
            None => warn!(type_id, port = key.as_str(), "Skipping malformed port declaration"),
        }
    }
    map
}

fn port_from_value(key: &str, value: &Value) -> Option<PortDeclaration> {
    let object = value.as_object()?;
    let name = string_field(object, "name").unwrap_or_else(|| key.to_string());

    // `type` is an integer, a name, or the generator's nested `{type, structTags}`.
    let (port_type, mut struct_tags) = match object.get("type") {
        Some(Value::Object(nested)) => (
            nested.get("type").map(port_type_from_value).unwrap_or_default(),
            tags_from_value(nested.get("structTags")),
        ),
        Some(other) => (port_type_from_value(other), Vec::new()),
        None => (PortType::Any, Vec::new()),
    };
    if struct_tags.is_empty() {
        struct_tags = tags_from_value(object.get("structTags").or(object.get("struct_tags")));
    }

    Some(PortDeclaration {
        spec: PortSpec {
            port_type,
            struct_tags,
        },
        name,
    })
}

fn port_type_from_value(value: &Value) -> PortType {
    match value {
        Value::Number(n) => n.as_i64().map(PortType::from_code).unwrap_or_default(),
        Value::String(s) => PortType::from_name(s),
        _ => PortType::Any,
    }
}

fn tags_from_value(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
