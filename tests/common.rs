//! Common test utilities for building catalogs and flows.
use disbotter_flow::prelude::*;
use std::sync::Arc;

/// The sample node declaration feed shipped in `data/`.
#[allow(dead_code)]
pub const NODES_JSON: &str = include_str!("../data/nodes.json");

/// A two-command project built against [`NODES_JSON`].
#[allow(dead_code)]
pub const SAMPLE_PROJECT: &str = include_str!("../data/sample.dbp");

/// Event node: a flow output plus the invoking user.
#[allow(dead_code)]
pub fn on_command() -> NodeTypeDescriptor {
    NodeTypeDescriptor::new("onCommand", "On Command")
        .with_category("Events")
        .with_flow_out()
        .with_output("user", "User", PortSpec::structure(["user", "user_resolvable"]))
}

/// Action node: flow in and out, one text input.
#[allow(dead_code)]
pub fn reply() -> NodeTypeDescriptor {
    NodeTypeDescriptor::new("reply", "Reply")
        .with_category("Messages")
        .with_flow_in()
        .with_input("text", "Text", PortType::Text)
        .with_flow_out()
        .with_default("text", serde_json::json!(""))
}

/// Pure node: requires a `user` tagged structure, produces text.
#[allow(dead_code)]
pub fn get_username() -> NodeTypeDescriptor {
    NodeTypeDescriptor::new("getUsername", "Get Username")
        .with_input("user", "User", PortSpec::structure(["user"]))
        .with_output("username", "Username", PortType::Text)
}

/// Pure node: requires a `text_channel` tagged structure.
#[allow(dead_code)]
pub fn channel_name() -> NodeTypeDescriptor {
    NodeTypeDescriptor::new("channelName", "Channel Name")
        .with_input("channel", "Channel", PortSpec::structure(["text_channel"]))
        .with_output("name", "Name", PortType::Text)
}

/// Pure node with an `Any` input.
#[allow(dead_code)]
pub fn to_text() -> NodeTypeDescriptor {
    NodeTypeDescriptor::new("toText", "To Text")
        .with_input("value", "Value", PortType::Any)
        .with_output("text", "Text", PortType::Text)
}

#[allow(dead_code)]
pub fn add_numbers() -> NodeTypeDescriptor {
    NodeTypeDescriptor::new("addNumbers", "Add")
        .with_input("a", "A", PortType::Number)
        .with_input("b", "B", PortType::Number)
        .with_output("sum", "Sum", PortType::Number)
}

/// Catalog of every fixture descriptor above, `onCommand` first.
#[allow(dead_code)]
pub fn basic_catalog() -> Arc<Catalog> {
    let catalog = Catalog::from_descriptors([
        on_command(),
        reply(),
        get_username(),
        channel_name(),
        to_text(),
        add_numbers(),
    ])
    .expect("fixture descriptors have unique ids");
    Arc::new(catalog)
}

/// Catalog loaded from the sample feed.
#[allow(dead_code)]
pub fn feed_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::from_feed_str(NODES_JSON).expect("sample feed loads"))
}

#[allow(dead_code)]
pub fn empty_flow() -> NodeFlow {
    NodeFlow::new(basic_catalog())
}

/// Places a node of a fixture type.
#[allow(dead_code)]
pub fn place(flow: &mut NodeFlow, type_id: &str, x: f64, y: f64) -> NodeId {
    flow.add_node_by_id(type_id, (x, y))
        .unwrap_or_else(|e| panic!("cannot place '{}': {}", type_id, e))
}

#[allow(dead_code)]
pub fn connect(
    flow: &mut NodeFlow,
    from: NodeId,
    from_key: &str,
    to: NodeId,
    to_key: &str,
) -> std::result::Result<ConnectionOutcome, ConnectionRejected> {
    flow.create_or_toggle_connection(ConnectionCandidate::new(from, from_key, to, to_key))
}
