//! Read-only traversal helpers for code generators walking a flow.

use super::connection::{Connection, PortRef};
use super::flow::NodeFlow;
use super::node::{NodeId, NodeInstance};
use crate::catalog::{FLOW_IN_KEY, FLOW_OUT_KEY};
use ahash::AHashSet;

impl NodeFlow {
    /// The input driven by an output port, if any. For flow outputs this is
    /// the single successor; for data outputs it is the first consumer.
    pub fn flow_target(&self, from: &PortRef) -> Option<&PortRef> {
        self.connections
            .iter()
            .find(|c| c.from.as_ref() == Some(from))
            .and_then(|c| c.to.as_ref())
    }

    /// The output feeding an input port, if any.
    pub fn input_source(&self, to: &PortRef) -> Option<&PortRef> {
        self.connections
            .iter()
            .find(|c| c.to.as_ref() == Some(to))
            .and_then(|c| c.from.as_ref())
    }

    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .iter()
            .filter(move |c| c.to.as_ref().is_some_and(|p| p.node == node))
    }

    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .iter()
            .filter(move |c| c.from.as_ref().is_some_and(|p| p.node == node))
    }

    pub fn nodes_of_type<'a>(&'a self, type_id: &'a str) -> impl Iterator<Item = &'a NodeInstance> {
        self.nodes.iter().filter(move |n| n.type_id() == type_id)
    }

    /// The chain of nodes reached from `start` by following `__flow_out__`
    /// into `__flow_in__`, starting with `start` itself. The walk stops at a
    /// missing link, a link into any other port, or a node already visited.
    pub fn control_sequence(&self, start: NodeId) -> Vec<NodeId> {
        if self.node(start).is_none() {
            return Vec::new();
        }

        let mut sequence = vec![start];
        let mut visited: AHashSet<NodeId> = AHashSet::from_iter([start]);
        let mut current = start;

        while let Some(target) = self.flow_target(&PortRef::new(current, FLOW_OUT_KEY)) {
            if target.key != FLOW_IN_KEY || !visited.insert(target.node) {
                break;
            }
            sequence.push(target.node);
            current = target.node;
        }
        sequence
    }
}
