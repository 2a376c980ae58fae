//! Consistency report for flows whose contents did not come through the
//! mutation API, such as flows decoded from older project files.

use super::connection::{ConnectionCandidate, PortRef};
use super::flow::NodeFlow;
use crate::error::ConnectionRejected;
use crate::port::PortType;
use ahash::AHashSet;
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Connection `index` would not be accepted by the mutation API.
    InvalidConnection {
        index: usize,
        reason: ConnectionRejected,
    },
    /// More than one connection drives the same input.
    SharedInput { node_uid: String, key: String },
    /// A flow output drives more than one connection.
    FlowFanOut { node_uid: String, key: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::InvalidConnection { index, reason } => {
                write!(f, "connection {} is invalid: {}", index, reason)
            }
            Violation::SharedInput { node_uid, key } => {
                write!(f, "input '{}' of node '{}' has several sources", key, node_uid)
            }
            Violation::FlowFanOut { node_uid, key } => {
                write!(f, "flow output '{}' of node '{}' drives several nodes", key, node_uid)
            }
        }
    }
}

impl NodeFlow {
    /// Lists every invariant breach present in the flow, in connection order.
    /// Pending connections are a valid state and are reported by
    /// [`NodeFlow::pending_connections`] instead.
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (index, connection) in self.connections.iter().enumerate() {
            let (Some(from), Some(to)) = (&connection.from, &connection.to) else {
                continue;
            };
            let candidate = ConnectionCandidate {
                from: from.clone(),
                to: to.clone(),
            };
            if let Err(reason) = self.validate_candidate(&candidate) {
                violations.push(Violation::InvalidConnection { index, reason });
            }
        }

        let input_counts = self
            .connections
            .iter()
            .filter_map(|c| c.to.as_ref())
            .counts();
        let flow_output_counts = self
            .connections
            .iter()
            .filter(|c| c.port_type == PortType::Flow)
            .filter_map(|c| c.from.as_ref())
            .counts();

        let mut reported_inputs: AHashSet<&PortRef> = AHashSet::new();
        let mut reported_outputs: AHashSet<&PortRef> = AHashSet::new();
        for connection in &self.connections {
            if let Some(to) = &connection.to {
                if input_counts[to] > 1 && reported_inputs.insert(to) {
                    violations.push(Violation::SharedInput {
                        node_uid: self.uid_for(to),
                        key: to.key.clone(),
                    });
                }
            }
            if let Some(from) = &connection.from {
                let shared = flow_output_counts.get(from).is_some_and(|&n| n > 1);
                if shared && reported_outputs.insert(from) {
                    violations.push(Violation::FlowFanOut {
                        node_uid: self.uid_for(from),
                        key: from.key.clone(),
                    });
                }
            }
        }

        violations
    }

    pub fn is_consistent(&self) -> bool {
        self.violations().is_empty()
    }

    /// Indices of connections missing one or both endpoints.
    pub fn pending_connections(&self) -> Vec<usize> {
        self.connections
            .iter()
            .positions(|c| c.is_pending())
            .collect()
    }

    fn uid_for(&self, port: &PortRef) -> String {
        self.node(port.node)
            .map(|n| n.uid().to_string())
            .unwrap_or_else(|| port.node.to_string())
    }
}
