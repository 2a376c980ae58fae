use super::node::NodeId;
use crate::port::{PortSpec, PortType};
use std::fmt;

/// One port of one node in a flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub node: NodeId,
    pub key: String,
}

impl PortRef {
    pub fn new(node: NodeId, key: impl Into<String>) -> Self {
        Self {
            node,
            key: key.into(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.key)
    }
}

/// A directed edge from an output port to an input port.
///
/// The port type and struct tags are those of the source output at the time
/// the connection was made. Either endpoint may be `None`, which marks the
/// connection as pending.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub port_type: PortType,
    pub struct_tags: Vec<String>,
    pub from: Option<PortRef>,
    pub to: Option<PortRef>,
}

impl Connection {
    pub fn is_pending(&self) -> bool {
        self.from.is_none() || self.to.is_none()
    }

    /// Whether this connection joins exactly these two ports.
    pub fn links(&self, from: &PortRef, to: &PortRef) -> bool {
        self.from.as_ref() == Some(from) && self.to.as_ref() == Some(to)
    }

    /// Whether either endpoint belongs to `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from.as_ref().is_some_and(|p| p.node == node)
            || self.to.as_ref().is_some_and(|p| p.node == node)
    }

    pub fn spec(&self) -> PortSpec {
        PortSpec {
            port_type: self.port_type,
            struct_tags: self.struct_tags.clone(),
        }
    }
}

/// A requested connection, always oriented output (`from`) to input (`to`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCandidate {
    pub from: PortRef,
    pub to: PortRef,
}

impl ConnectionCandidate {
    pub fn new(
        from_node: NodeId,
        from_key: impl Into<String>,
        to_node: NodeId,
        to_key: impl Into<String>,
    ) -> Self {
        Self {
            from: PortRef::new(from_node, from_key),
            to: PortRef::new(to_node, to_key),
        }
    }
}

/// What `create_or_toggle_connection` did to the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionOutcome {
    /// A new connection was inserted, replacing any it superseded.
    Created {
        connection: Connection,
        superseded: Vec<Connection>,
    },
    /// The identical connection already existed and was removed.
    Removed(Connection),
}
