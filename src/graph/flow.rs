use super::connection::{Connection, ConnectionCandidate, ConnectionOutcome, PortRef};
use super::node::{NodeId, NodeInstance, Position, new_uid};
use crate::catalog::{Catalog, NodeTypeDescriptor};
use crate::error::{CatalogError, ConnectionRejected, GraphError};
use crate::port::{PortSpec, PortType, is_compatible, missing_struct_tags};
use ahash::AHashSet;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// The node graph of one command.
///
/// Nodes are kept in insertion order, which is the order an external compiler
/// walks them in. Connections refer to nodes by [`NodeId`].
#[derive(Debug, Clone)]
pub struct NodeFlow {
    pub(crate) nodes: Vec<NodeInstance>,
    pub(crate) connections: Vec<Connection>,
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) option_nodes: Catalog,
    next_id: u32,
}

impl NodeFlow {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            nodes: Vec::new(),
            connections: Vec::new(),
            catalog,
            option_nodes: Catalog::new(),
            next_id: 0,
        }
    }

    pub fn nodes(&self) -> &[NodeInstance] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The shared catalog this flow was built against.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The synthetic entries derived from the owning command's options.
    pub fn option_nodes(&self) -> &Catalog {
        &self.option_nodes
    }

    /// Every node type placeable in this flow: the shared catalog followed by
    /// the option entries.
    pub fn available_nodes(&self) -> impl Iterator<Item = &Arc<NodeTypeDescriptor>> {
        self.catalog.iter().chain(self.option_nodes.iter())
    }

    pub fn resolve_type(&self, type_id: &str) -> Option<&Arc<NodeTypeDescriptor>> {
        self.catalog
            .get(type_id)
            .or_else(|| self.option_nodes.get(type_id))
    }

    /// The type substituted for references that no longer resolve.
    pub fn fallback_type(&self) -> Option<&Arc<NodeTypeDescriptor>> {
        self.available_nodes().next()
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeInstance> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeInstance, GraphError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(GraphError::NodeNotFound(id))
    }

    pub fn node_by_uid(&self, uid: &str) -> Option<&NodeInstance> {
        self.nodes.iter().find(|n| n.uid == uid)
    }

    /// Places a node of the given type with no connections. The node's
    /// hardcoded inputs start from the type's declared defaults. Non-finite
    /// coordinates are placed at `0.0`.
    pub fn add_node(
        &mut self,
        descriptor: &Arc<NodeTypeDescriptor>,
        position: impl Into<Position>,
    ) -> NodeId {
        let position = position.into();
        if !position.is_finite() {
            warn!(x = position.x, y = position.y, "Non-finite node position, using origin");
        }
        let hardcoded = descriptor.default_hardcoded.clone();
        let id = self.insert_node(
            new_uid(),
            Arc::clone(descriptor),
            position.finite_or_origin(),
            hardcoded,
        );
        debug!(node = %id, type_id = descriptor.id.as_str(), "Added node");
        id
    }

    /// Places a node by type id, resolved against [`NodeFlow::available_nodes`].
    pub fn add_node_by_id(
        &mut self,
        type_id: &str,
        position: impl Into<Position>,
    ) -> Result<NodeId, CatalogError> {
        let descriptor = self
            .resolve_type(type_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(type_id.to_string()))?;
        Ok(self.add_node(&descriptor, position))
    }

    pub(crate) fn insert_node(
        &mut self,
        uid: String,
        descriptor: Arc<NodeTypeDescriptor>,
        position: Position,
        input_hardcoded: BTreeMap<String, serde_json::Value>,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(NodeInstance {
            id,
            uid,
            descriptor,
            position,
            input_hardcoded,
        });
        id
    }

    /// Moves a node. Non-finite coordinates are refused and the node stays put.
    pub fn move_node(
        &mut self,
        id: NodeId,
        position: impl Into<Position>,
    ) -> Result<(), GraphError> {
        let position = position.into();
        if !position.is_finite() {
            return Err(GraphError::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Sets the literal value of a declared input. Returns the previous value.
    pub fn set_hardcoded(
        &mut self,
        id: NodeId,
        key: &str,
        value: serde_json::Value,
    ) -> Result<Option<serde_json::Value>, GraphError> {
        let node = self.node_mut(id)?;
        if node.descriptor.input(key).is_none() {
            return Err(GraphError::UnknownInput {
                type_id: node.descriptor.id.clone(),
                key: key.to_string(),
            });
        }
        Ok(node.input_hardcoded.insert(key.to_string(), value))
    }

    pub fn clear_hardcoded(
        &mut self,
        id: NodeId,
        key: &str,
    ) -> Result<Option<serde_json::Value>, GraphError> {
        Ok(self.node_mut(id)?.input_hardcoded.remove(key))
    }

    /// Removes every connection that has `id` as either endpoint.
    pub fn remove_related_connections(&mut self, id: NodeId) -> Vec<Connection> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.connections)
            .into_iter()
            .partition(|c| c.touches(id));
        self.connections = kept;
        removed
    }

    /// Removes the given nodes. Connections touching them are removed first.
    /// Unknown ids are ignored.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> Vec<NodeInstance> {
        let targets: AHashSet<NodeId> = ids.iter().copied().collect();
        let mut dropped_connections = 0;
        for &id in &targets {
            dropped_connections += self.remove_related_connections(id).len();
        }

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.nodes)
            .into_iter()
            .partition(|n| targets.contains(&n.id));
        self.nodes = kept;

        debug!(
            nodes = removed.len(),
            connections = dropped_connections,
            "Removed nodes"
        );
        removed
    }

    /// Checks a candidate against the current graph without mutating it.
    /// On success returns the spec of the source output.
    pub fn validate_candidate(
        &self,
        candidate: &ConnectionCandidate,
    ) -> Result<PortSpec, ConnectionRejected> {
        let from_node = self
            .node(candidate.from.node)
            .ok_or(ConnectionRejected::NodeNotFound(candidate.from.node))?;
        let to_node = self
            .node(candidate.to.node)
            .ok_or(ConnectionRejected::NodeNotFound(candidate.to.node))?;

        if from_node.id == to_node.id {
            return Err(ConnectionRejected::SelfLoop {
                node_uid: from_node.uid.clone(),
            });
        }

        let output = from_node
            .descriptor
            .output(&candidate.from.key)
            .ok_or_else(|| ConnectionRejected::UnknownOutput {
                type_id: from_node.descriptor.id.clone(),
                key: candidate.from.key.clone(),
            })?;
        let input = to_node
            .descriptor
            .input(&candidate.to.key)
            .ok_or_else(|| ConnectionRejected::UnknownInput {
                type_id: to_node.descriptor.id.clone(),
                key: candidate.to.key.clone(),
            })?;

        check_ports(&output.spec, &input.spec)?;
        Ok(output.spec.clone())
    }

    /// Connects two ports, or disconnects them if that exact connection exists.
    ///
    /// A new connection replaces whatever drove the destination input and, for
    /// a flow output, whatever that output already drove. A rejected candidate
    /// leaves the graph untouched.
    pub fn create_or_toggle_connection(
        &mut self,
        candidate: ConnectionCandidate,
    ) -> Result<ConnectionOutcome, ConnectionRejected> {
        if let Some(index) = self
            .connections
            .iter()
            .position(|c| c.links(&candidate.from, &candidate.to))
        {
            let removed = self.connections.remove(index);
            debug!(from = %candidate.from, to = %candidate.to, "Toggled connection off");
            return Ok(ConnectionOutcome::Removed(removed));
        }

        let spec = self.validate_candidate(&candidate)?;

        let flow_source = spec.is_flow();
        let (superseded, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.connections)
            .into_iter()
            .partition(|c| {
                c.to.as_ref() == Some(&candidate.to)
                    || (flow_source && c.from.as_ref() == Some(&candidate.from))
            });
        self.connections = kept;

        let connection = Connection {
            port_type: spec.port_type,
            struct_tags: spec.struct_tags,
            from: Some(candidate.from),
            to: Some(candidate.to),
        };
        self.connections.push(connection.clone());

        debug!(
            port_type = %connection.port_type,
            superseded = superseded.len(),
            "Created connection"
        );
        Ok(ConnectionOutcome::Created {
            connection,
            superseded,
        })
    }

    pub(crate) fn push_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    /// Re-checks the connections selected by `filter` against the current node
    /// types. Survivors get their captured port type refreshed; the rest are
    /// removed and returned.
    pub fn revalidate_connections<F>(&mut self, filter: F) -> Vec<Connection>
    where
        F: Fn(&Connection) -> bool,
    {
        let mut dropped = Vec::new();
        let mut kept = Vec::with_capacity(self.connections.len());

        for mut connection in std::mem::take(&mut self.connections) {
            if !filter(&connection) {
                kept.push((connection, false));
                continue;
            }
            match self.recheck(&connection) {
                Ok(Some(spec)) => {
                    connection.port_type = spec.port_type;
                    connection.struct_tags = spec.struct_tags;
                    kept.push((connection, true));
                }
                Ok(None) => kept.push((connection, true)),
                Err(reason) => {
                    warn!(%reason, "Dropping connection that no longer fits its ports");
                    dropped.push(connection);
                }
            }
        }

        // A refreshed source may have become a flow output; keep only its
        // newest rechecked connection. Connections outside `filter` stay as
        // they are.
        let mut flow_sources = AHashSet::new();
        let mut deduped = Vec::with_capacity(kept.len());
        for (connection, rechecked) in kept.into_iter().rev() {
            let duplicate_flow = rechecked
                && connection.port_type == PortType::Flow
                && connection
                    .from
                    .as_ref()
                    .is_some_and(|from| !flow_sources.insert(from.clone()));
            if duplicate_flow {
                dropped.push(connection);
            } else {
                deduped.push(connection);
            }
        }
        deduped.reverse();
        self.connections = deduped;
        dropped
    }

    /// `Ok(None)` means there is no source port to refresh from.
    fn recheck(&self, connection: &Connection) -> Result<Option<PortSpec>, ConnectionRejected> {
        let (Some(from), to) = (&connection.from, &connection.to) else {
            return Ok(None);
        };
        match to {
            Some(to) => self
                .validate_candidate(&ConnectionCandidate {
                    from: from.clone(),
                    to: to.clone(),
                })
                .map(Some),
            None => {
                let node = self
                    .node(from.node)
                    .ok_or(ConnectionRejected::NodeNotFound(from.node))?;
                let output = node.descriptor.output(&from.key).ok_or_else(|| {
                    ConnectionRejected::UnknownOutput {
                        type_id: node.descriptor.id.clone(),
                        key: from.key.clone(),
                    }
                })?;
                Ok(Some(output.spec.clone()))
            }
        }
    }

    /// Points every node of type `old_id` at `descriptor`.
    pub(crate) fn retarget_nodes(
        &mut self,
        old_id: &str,
        descriptor: &Arc<NodeTypeDescriptor>,
    ) -> AHashSet<NodeId> {
        let mut retargeted = AHashSet::new();
        for node in self.nodes.iter_mut().filter(|n| n.descriptor.id == old_id) {
            node.descriptor = Arc::clone(descriptor);
            retargeted.insert(node.id);
        }
        retargeted
    }

    /// Swaps in a newly published shared catalog. Nodes are re-resolved by
    /// type id (falling back to the first available type) and all connections
    /// are re-validated. Returns the connections that were dropped.
    pub fn rebind_catalog(&mut self, catalog: Arc<Catalog>) -> Vec<Connection> {
        self.catalog = catalog;

        let mut rebound = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if self.option_nodes.contains(&node.descriptor.id) {
                rebound.push(Arc::clone(&node.descriptor));
                continue;
            }
            let descriptor = match self.catalog.get(&node.descriptor.id) {
                Some(descriptor) => Arc::clone(descriptor),
                None => match self.fallback_type() {
                    Some(fallback) => {
                        warn!(
                            node = node.uid.as_str(),
                            type_id = node.descriptor.id.as_str(),
                            fallback = fallback.id.as_str(),
                            "Node type missing from published catalog, using fallback"
                        );
                        Arc::clone(fallback)
                    }
                    None => Arc::clone(&node.descriptor),
                },
            };
            rebound.push(descriptor);
        }
        for (node, descriptor) in self.nodes.iter_mut().zip(rebound) {
            node.descriptor = descriptor;
        }

        self.revalidate_connections(|_| true)
    }

    fn uid_of<'a>(&'a self, port: &'a Option<PortRef>) -> Option<(&'a str, &'a str)> {
        port.as_ref().map(|p| {
            let uid = self.node(p.node).map(|n| n.uid.as_str()).unwrap_or_default();
            (uid, p.key.as_str())
        })
    }
}

/// Checks type and tag compatibility between a source output and a target input.
pub(crate) fn check_ports(output: &PortSpec, input: &PortSpec) -> Result<(), ConnectionRejected> {
    if is_compatible(output, input) {
        return Ok(());
    }
    if output.port_type == PortType::Structure && input.port_type == PortType::Structure {
        return Err(ConnectionRejected::MissingStructTags {
            missing: missing_struct_tags(output, input),
        });
    }
    Err(ConnectionRejected::IncompatiblePorts {
        output: output.port_type,
        input: input.port_type,
    })
}

// Two flows are equal when their nodes and connections match field for field,
// with connection endpoints compared by node uid rather than by handle.
impl PartialEq for NodeFlow {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
            && self.connections.len() == other.connections.len()
            && self
                .connections
                .iter()
                .zip(&other.connections)
                .all(|(a, b)| {
                    a.port_type == b.port_type
                        && a.struct_tags == b.struct_tags
                        && self.uid_of(&a.from) == other.uid_of(&b.from)
                        && self.uid_of(&a.to) == other.uid_of(&b.to)
                })
    }
}
