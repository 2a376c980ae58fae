use crate::graph::NodeId;
use crate::port::PortType;
use thiserror::Error;

/// Errors raised by the node type catalog and the declaration feed loader.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Node type '{0}' is already registered")]
    DuplicateId(String),

    #[error("Node type '{0}' is not registered")]
    NotFound(String),

    #[error("Invalid node declaration feed: {0}")]
    InvalidFeed(String),
}

/// Reasons a connection candidate is refused. A refusal never mutates the graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionRejected {
    #[error("Node {0} does not exist in this flow")]
    NodeNotFound(NodeId),

    #[error("Cannot connect node '{node_uid}' to itself")]
    SelfLoop { node_uid: String },

    #[error("Node type '{type_id}' has no output port '{key}'")]
    UnknownOutput { type_id: String, key: String },

    #[error("Node type '{type_id}' has no input port '{key}'")]
    UnknownInput { type_id: String, key: String },

    #[error("Port types are incompatible: {output:?} output cannot drive a {input:?} input")]
    IncompatiblePorts { output: PortType, input: PortType },

    #[error("Structure output is missing required tags: {}", missing.join(", "))]
    MissingStructTags { missing: Vec<String> },
}

/// Errors for node level edits (position, hardcoded values).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {0} does not exist in this flow")]
    NodeNotFound(NodeId),

    #[error("Node type '{type_id}' has no input port '{key}'")]
    UnknownInput { type_id: String, key: String },

    #[error("Position ({x}, {y}) is not a finite canvas coordinate")]
    InvalidPosition { x: f64, y: f64 },
}

/// Errors for command option edits.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionError {
    #[error("Option name '{name}' conflicts with existing node type '{type_id}'")]
    NameConflict { name: String, type_id: String },

    #[error("Command has no option named '{0}'")]
    NotFound(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors that can occur while reading or writing `.dbp` documents.
#[derive(Error, Debug, Clone)]
pub enum CodecError {
    #[error("Failed to parse project JSON: {0}")]
    JsonParseError(String),

    #[error("Failed to serialize project: {0}")]
    SerializeError(String),
}

/// Errors returned by the project aggregate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectError {
    #[error("Project has no command with uid '{0}'")]
    CommandNotFound(String),

    #[error("No command is currently being edited")]
    NoCommandEditing,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
