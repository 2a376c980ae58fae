//! Conversion between in-memory projects and `.dbp` documents.
//!
//! Encoding is total. Decoding never fails on content: node types that do not
//! resolve are handled by the decoder's [`MissingTypePolicy`] and connection
//! endpoints whose node uid is unknown are left pending. Only malformed JSON
//! is an error.

pub mod document;

pub use document::*;

use crate::catalog::{Catalog, CatalogState, NodeTypeDescriptor};
use crate::command::Command;
use crate::error::CodecError;
use crate::graph::{Connection, NodeFlow, NodeId, PortRef, Position};
use crate::project::Project;
use ahash::AHashMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub fn flow_to_document(flow: &NodeFlow) -> FlowDocument {
    let nodes = flow
        .nodes()
        .iter()
        .map(|node| NodeDocument {
            uid: node.uid().to_string(),
            type_id: node.type_id().to_string(),
            x: node.position().x,
            y: node.position().y,
            input_hardcoded: node.input_hardcoded().clone(),
        })
        .collect();

    let connections = flow
        .connections()
        .iter()
        .map(|connection| {
            let (from, from_key) = endpoint_to_document(flow, connection.from.as_ref());
            let (to, to_key) = endpoint_to_document(flow, connection.to.as_ref());
            ConnectionDocument {
                port_type: connection.port_type,
                struct_tags: connection.struct_tags.clone(),
                from,
                from_key,
                to,
                to_key,
            }
        })
        .collect();

    FlowDocument { nodes, connections }
}

fn endpoint_to_document(
    flow: &NodeFlow,
    port: Option<&PortRef>,
) -> (Option<String>, Option<String>) {
    match port.and_then(|p| flow.node(p.node).map(|n| (n, p))) {
        Some((node, port)) => (Some(node.uid().to_string()), Some(port.key.clone())),
        None => (None, None),
    }
}

pub fn command_to_document(command: &Command) -> CommandDocument {
    CommandDocument {
        uid: command.uid().to_string(),
        name: command.name.clone(),
        description: command.description.clone(),
        options: command.options().to_vec(),
        flow: flow_to_document(command.flow()),
    }
}

pub fn project_to_document(project: &Project) -> ProjectDocument {
    ProjectDocument {
        metadata: ProjectMetadata {
            name: project.name.clone(),
        },
        content: ProjectContent {
            commands: project.commands().iter().map(command_to_document).collect(),
        },
    }
}

/// Serializes a project to pretty-printed `.dbp` JSON.
pub fn to_json_string(project: &Project) -> Result<String, CodecError> {
    serde_json::to_string_pretty(&project_to_document(project))
        .map_err(|e| CodecError::SerializeError(e.to_string()))
}

/// What to do with a node whose type id is not in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingTypePolicy {
    /// Substitute the first available node type.
    #[default]
    FallbackToFirst,
    /// Drop the node. Connections to it are kept as pending.
    Skip,
}

pub struct DecoderBuilder {
    catalog: Arc<Catalog>,
    aliases: AHashMap<String, String>,
    missing_type_policy: MissingTypePolicy,
}

impl DecoderBuilder {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            aliases: AHashMap::new(),
            missing_type_policy: MissingTypePolicy::default(),
        }
    }

    /// Resolves nodes saved with type `old_id` as `new_id`.
    pub fn with_type_alias(mut self, old_id: &str, new_id: &str) -> Self {
        self.aliases.insert(old_id.to_string(), new_id.to_string());
        self
    }

    pub fn with_missing_type_policy(mut self, policy: MissingTypePolicy) -> Self {
        self.missing_type_policy = policy;
        self
    }

    pub fn build(self) -> Decoder {
        Decoder {
            catalog: self.catalog,
            aliases: self.aliases,
            missing_type_policy: self.missing_type_policy,
        }
    }
}

/// Rebuilds flows, commands, and projects from documents against a catalog.
pub struct Decoder {
    catalog: Arc<Catalog>,
    aliases: AHashMap<String, String>,
    missing_type_policy: MissingTypePolicy,
}

impl Decoder {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        DecoderBuilder::new(catalog).build()
    }

    pub fn builder(catalog: Arc<Catalog>) -> DecoderBuilder {
        DecoderBuilder::new(catalog)
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn parse_project(&self, json: &str) -> Result<Project, CodecError> {
        let document: ProjectDocument =
            serde_json::from_str(json).map_err(|e| CodecError::JsonParseError(e.to_string()))?;
        Ok(self.decode_project(&document))
    }

    pub fn decode_project(&self, document: &ProjectDocument) -> Project {
        let commands = document
            .content
            .commands
            .iter()
            .map(|c| self.decode_command(c))
            .collect();
        debug!(
            project = document.metadata.name.as_str(),
            commands = document.content.commands.len(),
            "Decoded project"
        );
        Project::from_parts(
            document.metadata.name.clone(),
            commands,
            CatalogState::Ready(Arc::clone(&self.catalog)),
        )
    }

    /// Options are registered before the flow is rebuilt so that option nodes
    /// resolve to their synthetic types.
    pub fn decode_command(&self, document: &CommandDocument) -> Command {
        let mut command = Command::from_parts(
            document.uid.clone(),
            document.name.clone(),
            document.description.clone(),
            NodeFlow::new(Arc::clone(&self.catalog)),
        );
        for option in &document.options {
            match command.add_option(option.clone()) {
                Ok(name) if name != option.name => {
                    warn!(
                        command = document.uid.as_str(),
                        option = option.name.as_str(),
                        renamed = name.as_str(),
                        "Renamed clashing option while decoding"
                    );
                }
                Ok(_) => {}
                Err(e) => warn!(command = document.uid.as_str(), error = %e, "Skipping option"),
            }
        }
        self.populate_flow(command.flow_mut(), &document.flow);
        command
    }

    /// Rebuilds a flow, given the option entries of the command it belongs to.
    pub fn decode_flow(&self, document: &FlowDocument, option_nodes: Catalog) -> NodeFlow {
        let mut flow = NodeFlow::new(Arc::clone(&self.catalog));
        flow.option_nodes = option_nodes;
        self.populate_flow(&mut flow, document);
        flow
    }

    fn populate_flow(&self, flow: &mut NodeFlow, document: &FlowDocument) {
        let mut handles: AHashMap<&str, NodeId> = AHashMap::with_capacity(document.nodes.len());
        for node in &document.nodes {
            let Some(descriptor) = self.resolve_type(flow, &node.type_id) else {
                continue;
            };
            let id = flow.insert_node(
                node.uid.clone(),
                descriptor,
                Position::new(node.x, node.y),
                node.input_hardcoded.clone(),
            );
            handles.insert(node.uid.as_str(), id);
        }

        for connection in &document.connections {
            flow.push_connection(Connection {
                port_type: connection.port_type,
                struct_tags: connection.struct_tags.clone(),
                from: resolve_endpoint(
                    &handles,
                    connection.from.as_deref(),
                    connection.from_key.as_deref(),
                ),
                to: resolve_endpoint(
                    &handles,
                    connection.to.as_deref(),
                    connection.to_key.as_deref(),
                ),
            });
        }
    }

    fn resolve_type(&self, flow: &NodeFlow, type_id: &str) -> Option<Arc<NodeTypeDescriptor>> {
        let type_id = self.aliases.get(type_id).map(String::as_str).unwrap_or(type_id);
        if let Some(descriptor) = flow.resolve_type(type_id) {
            return Some(Arc::clone(descriptor));
        }

        let fallback = match self.missing_type_policy {
            MissingTypePolicy::FallbackToFirst => flow.fallback_type().cloned(),
            MissingTypePolicy::Skip => None,
        };
        match &fallback {
            Some(descriptor) => warn!(
                type_id,
                fallback = descriptor.id.as_str(),
                "Unknown node type, using fallback"
            ),
            None => warn!(type_id, "Unknown node type, skipping node"),
        }
        fallback
    }
}

fn resolve_endpoint(
    handles: &AHashMap<&str, NodeId>,
    uid: Option<&str>,
    key: Option<&str>,
) -> Option<PortRef> {
    let (uid, key) = (uid?, key?);
    match handles.get(uid) {
        Some(&node) => Some(PortRef::new(node, key)),
        None => {
            warn!(uid, key, "Connection endpoint refers to an unknown node, leaving it pending");
            None
        }
    }
}
