use crate::port::{PortSpec, PortType};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Key of the conventional control-flow input port.
pub const FLOW_IN_KEY: &str = "__flow_in__";
/// Key of the conventional control-flow output port.
pub const FLOW_OUT_KEY: &str = "__flow_out__";

pub const DEFAULT_NODE_COLOR: &str = "#e91e63";

/// A single declared port: its display name and type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortDeclaration {
    #[serde(rename = "type")]
    pub spec: PortSpec,
    pub name: String,
}

impl PortDeclaration {
    pub fn new(name: impl Into<String>, spec: impl Into<PortSpec>) -> Self {
        Self {
            spec: spec.into(),
            name: name.into(),
        }
    }

    pub fn port_type(&self) -> PortType {
        self.spec.port_type
    }
}

/// Port declarations keyed by port key, kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortMap {
    entries: Vec<(String, PortDeclaration)>,
}

impl PortMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a port. Re-declaring an existing key replaces it in place.
    pub fn insert(&mut self, key: impl Into<String>, port: PortDeclaration) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = port,
            None => self.entries.push((key, port)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PortDeclaration> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, port)| port)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PortDeclaration)> {
        self.entries.iter().map(|(k, port)| (k.as_str(), port))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, PortDeclaration)> for PortMap {
    fn from_iter<T: IntoIterator<Item = (K, PortDeclaration)>>(iter: T) -> Self {
        let mut map = PortMap::new();
        for (key, port) in iter {
            map.insert(key, port);
        }
        map
    }
}

impl Serialize for PortMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, port) in &self.entries {
            map.serialize_entry(key, port)?;
        }
        map.end()
    }
}

/// The declaration of a node type, shared by every node placed from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeDescriptor {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub color: String,
    pub icon: String,
    pub inputs: PortMap,
    pub outputs: PortMap,
    pub default_hardcoded: BTreeMap<String, serde_json::Value>,
}

impl NodeTypeDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: String::new(),
            color: DEFAULT_NODE_COLOR.to_string(),
            icon: String::new(),
            inputs: PortMap::new(),
            outputs: PortMap::new(),
            default_hardcoded: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_input(
        mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        spec: impl Into<PortSpec>,
    ) -> Self {
        self.inputs.insert(key, PortDeclaration::new(name, spec));
        self
    }

    pub fn with_output(
        mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        spec: impl Into<PortSpec>,
    ) -> Self {
        self.outputs.insert(key, PortDeclaration::new(name, spec));
        self
    }

    /// Adds the conventional `__flow_in__` input.
    pub fn with_flow_in(self) -> Self {
        self.with_input(FLOW_IN_KEY, "flow_in", PortType::Flow)
    }

    /// Adds the conventional `__flow_out__` output.
    pub fn with_flow_out(self) -> Self {
        self.with_output(FLOW_OUT_KEY, "flow_out", PortType::Flow)
    }

    pub fn with_default(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.default_hardcoded.insert(key.into(), value);
        self
    }

    pub fn input(&self, key: &str) -> Option<&PortDeclaration> {
        self.inputs.get(key)
    }

    pub fn output(&self, key: &str) -> Option<&PortDeclaration> {
        self.outputs.get(key)
    }
}
