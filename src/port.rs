//! Port types and the connection compatibility rules between them.
//!
//! Every node port has a [`PortType`]. Structure ports additionally carry a
//! set of struct tags: an output *offers* its tags and an input *requires*
//! its tags, so a structure output can drive a structure input only when it
//! offers every tag the input requires.

use ahash::AHashSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The kind of value (or control signal) carried by a port.
///
/// On the wire a port type is its integer discriminant.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortType {
    Flow = 0,
    Number = 1,
    Text = 2,
    Boolean = 3,
    Structure = 4,
    #[default]
    Any = 5,
}

impl PortType {
    pub const ALL: [PortType; 6] = [
        PortType::Flow,
        PortType::Number,
        PortType::Text,
        PortType::Boolean,
        PortType::Structure,
        PortType::Any,
    ];

    /// Maps a wire integer to a port type. Unknown values become `Any`.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => PortType::Flow,
            1 => PortType::Number,
            2 => PortType::Text,
            3 => PortType::Boolean,
            4 => PortType::Structure,
            _ => PortType::Any,
        }
    }

    /// Maps a declaration name (`"flow"`, `"struct"`, ...) to a port type.
    /// Unknown names become `Any`.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "flow" => PortType::Flow,
            "number" => PortType::Number,
            "text" => PortType::Text,
            "boolean" | "bool" => PortType::Boolean,
            "struct" | "structure" => PortType::Structure,
            _ => PortType::Any,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn color(self) -> &'static str {
        color_for(self)
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PortType::Flow => "flow",
            PortType::Number => "number",
            PortType::Text => "text",
            PortType::Boolean => "boolean",
            PortType::Structure => "struct",
            PortType::Any => "any",
        };
        f.write_str(name)
    }
}

impl Serialize for PortType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for PortType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = i64::deserialize(deserializer)?;
        Ok(PortType::from_code(code))
    }
}

/// The editor color used to draw ports and wires of a given type.
pub fn color_for(port_type: PortType) -> &'static str {
    match port_type {
        PortType::Flow => "#ffffff",
        PortType::Number => "#2f904b",
        PortType::Text => "#eeab2c",
        PortType::Boolean => "#ee5339",
        PortType::Structure => "#427ade",
        PortType::Any => "#8338f9",
    }
}

/// A port's type together with its struct tags.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    #[serde(rename = "type")]
    pub port_type: PortType,
    #[serde(rename = "structTags", default)]
    pub struct_tags: Vec<String>,
}

impl PortSpec {
    pub fn new(port_type: PortType) -> Self {
        Self {
            port_type,
            struct_tags: Vec::new(),
        }
    }

    pub fn structure<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            port_type: PortType::Structure,
            struct_tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_flow(&self) -> bool {
        self.port_type == PortType::Flow
    }
}

impl From<PortType> for PortSpec {
    fn from(port_type: PortType) -> Self {
        PortSpec::new(port_type)
    }
}

/// Returns the tags `input` requires that `output` does not offer.
///
/// Only meaningful when both sides are structure ports; otherwise the result
/// is always empty.
pub fn missing_struct_tags(output: &PortSpec, input: &PortSpec) -> Vec<String> {
    if output.port_type != PortType::Structure || input.port_type != PortType::Structure {
        return Vec::new();
    }
    let offered: AHashSet<&str> = output.struct_tags.iter().map(String::as_str).collect();
    input
        .struct_tags
        .iter()
        .filter(|tag| !offered.contains(tag.as_str()))
        .cloned()
        .collect()
}

/// Whether an output port may drive an input port.
///
/// Types must match exactly unless either side is `Any`; two structure ports
/// additionally need the input's required tags to be a subset of the output's.
pub fn is_compatible(output: &PortSpec, input: &PortSpec) -> bool {
    if output.port_type == PortType::Any || input.port_type == PortType::Any {
        return true;
    }
    output.port_type == input.port_type && missing_struct_tags(output, input).is_empty()
}
