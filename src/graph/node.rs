use crate::catalog::NodeTypeDescriptor;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Handle of a node inside one flow. Handles are never reused within a flow
/// and carry no meaning outside of it; persisted documents use the node uid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allocates a fresh, process-unique node or command uid.
pub fn new_uid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Replaces non-finite components with `0.0`.
    pub fn finite_or_origin(self) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self::new(finite(self.x), finite(self.y))
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Position { x, y }
    }
}

/// A node placed in a flow.
#[derive(Debug, Clone)]
pub struct NodeInstance {
    pub(crate) id: NodeId,
    pub(crate) uid: String,
    pub(crate) descriptor: Arc<NodeTypeDescriptor>,
    pub(crate) position: Position,
    pub(crate) input_hardcoded: BTreeMap<String, serde_json::Value>,
}

impl NodeInstance {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn descriptor(&self) -> &Arc<NodeTypeDescriptor> {
        &self.descriptor
    }

    pub fn type_id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Literal values typed directly into unconnected inputs.
    pub fn input_hardcoded(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.input_hardcoded
    }

    pub fn hardcoded(&self, key: &str) -> Option<&serde_json::Value> {
        self.input_hardcoded.get(key)
    }
}

// The handle is flow-local, so equality only looks at persisted fields.
impl PartialEq for NodeInstance {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
            && self.descriptor.id == other.descriptor.id
            && self.position == other.position
            && self.input_hardcoded == other.input_hardcoded
    }
}
