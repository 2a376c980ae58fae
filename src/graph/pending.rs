use super::connection::{Connection, ConnectionCandidate, PortRef};
use super::flow::NodeFlow;
use super::node::NodeId;

/// The port a connection drag started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragAnchor {
    Output(PortRef),
    Input(PortRef),
}

/// A connection being dragged out of a port, not yet attached at the other end.
///
/// Drags may start on either side; [`PendingConnection::complete`] orients the
/// result so the output side is always `from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConnection {
    anchor: DragAnchor,
}

impl PendingConnection {
    pub fn from_output(node: NodeId, key: impl Into<String>) -> Self {
        Self {
            anchor: DragAnchor::Output(PortRef::new(node, key)),
        }
    }

    pub fn from_input(node: NodeId, key: impl Into<String>) -> Self {
        Self {
            anchor: DragAnchor::Input(PortRef::new(node, key)),
        }
    }

    pub fn anchor(&self) -> &DragAnchor {
        &self.anchor
    }

    /// The dangling connection to draw while dragging. `None` if the anchor
    /// port is not declared on its node.
    pub fn preview(&self, flow: &NodeFlow) -> Option<Connection> {
        let (port, declaration) = match &self.anchor {
            DragAnchor::Output(port) => (port, flow.node(port.node)?.descriptor.output(&port.key)?),
            DragAnchor::Input(port) => (port, flow.node(port.node)?.descriptor.input(&port.key)?),
        };
        let (from, to) = match self.anchor {
            DragAnchor::Output(_) => (Some(port.clone()), None),
            DragAnchor::Input(_) => (None, Some(port.clone())),
        };
        Some(Connection {
            port_type: declaration.spec.port_type,
            struct_tags: declaration.spec.struct_tags.clone(),
            from,
            to,
        })
    }

    /// Drops the drag onto `target`, producing the candidate to submit to
    /// [`NodeFlow::create_or_toggle_connection`].
    pub fn complete(self, target: PortRef) -> ConnectionCandidate {
        match self.anchor {
            DragAnchor::Output(from) => ConnectionCandidate { from, to: target },
            DragAnchor::Input(to) => ConnectionCandidate { from: target, to },
        }
    }
}
