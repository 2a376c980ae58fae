//! Serde shapes of the `.dbp` project file.
//!
//! Field names are the ones the bot code generator reads, so saved projects
//! stay interchangeable with it.

use crate::command::CommandOption;
use crate::graph::new_uid;
use crate::port::PortType;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(default)]
    pub metadata: ProjectMetadata,
    #[serde(default)]
    pub content: ProjectContent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectContent {
    #[serde(default)]
    pub commands: Vec<CommandDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDocument {
    #[serde(default = "new_uid")]
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub flow: FlowDocument,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub connections: Vec<ConnectionDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    #[serde(default = "new_uid")]
    pub uid: String,
    #[serde(rename = "type", alias = "typeId")]
    pub type_id: String,
    #[serde(default, deserialize_with = "coordinate")]
    pub x: f64,
    #[serde(default, deserialize_with = "coordinate")]
    pub y: f64,
    #[serde(rename = "inputHardcoded", default)]
    pub input_hardcoded: BTreeMap<String, serde_json::Value>,
}

/// A connection as stored on disk. Endpoints are node uids; `null` marks a
/// pending end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDocument {
    #[serde(rename = "type", alias = "portType", default)]
    pub port_type: PortType,
    #[serde(rename = "structTags", default)]
    pub struct_tags: Vec<String>,
    #[serde(alias = "fromUid", default)]
    pub from: Option<String>,
    #[serde(rename = "fromKey", default)]
    pub from_key: Option<String>,
    #[serde(alias = "toUid", default)]
    pub to: Option<String>,
    #[serde(rename = "toKey", default)]
    pub to_key: Option<String>,
}

/// Reads a canvas coordinate. Non-finite numbers are written as `null`, so
/// `null` reads back as `0.0`.
fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}
