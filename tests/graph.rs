//! Tests for node placement, connection rules, and flow traversal.
mod common;
use common::*;
use disbotter_flow::prelude::*;
use serde_json::json;

#[test]
fn test_scenario_connect_then_toggle_off() {
    let mut flow = empty_flow();
    let trigger = place(&mut flow, "onCommand", 0.0, 0.0);
    assert_eq!(flow.nodes().len(), 1);
    assert!(flow.connections().is_empty());

    let reply = place(&mut flow, "reply", 100.0, 0.0);
    let outcome = connect(&mut flow, trigger, FLOW_OUT_KEY, reply, FLOW_IN_KEY).unwrap();
    assert!(matches!(
        outcome,
        ConnectionOutcome::Created { ref superseded, .. } if superseded.is_empty()
    ));
    assert_eq!(flow.nodes().len(), 2);
    assert_eq!(flow.connections().len(), 1);

    let outcome = connect(&mut flow, trigger, FLOW_OUT_KEY, reply, FLOW_IN_KEY).unwrap();
    assert!(matches!(outcome, ConnectionOutcome::Removed(_)));
    assert_eq!(flow.nodes().len(), 2);
    assert!(flow.connections().is_empty());
}

#[test]
fn test_scenario_output_to_output_is_rejected() {
    let mut flow = empty_flow();
    let a = place(&mut flow, "onCommand", 0.0, 0.0);
    let b = place(&mut flow, "onCommand", 0.0, 100.0);

    let result = connect(&mut flow, a, FLOW_OUT_KEY, b, FLOW_OUT_KEY);
    assert_eq!(
        result.unwrap_err(),
        ConnectionRejected::UnknownInput {
            type_id: "onCommand".to_string(),
            key: FLOW_OUT_KEY.to_string(),
        }
    );
    assert!(flow.connections().is_empty());
}

#[test]
fn test_toggle_pair_restores_same_connection() {
    let mut flow = empty_flow();
    let trigger = place(&mut flow, "onCommand", 0.0, 0.0);
    let lookup = place(&mut flow, "getUsername", 200.0, 0.0);

    connect(&mut flow, trigger, "user", lookup, "user").unwrap();
    let original = flow.connections()[0].clone();
    assert_eq!(original.port_type, PortType::Structure);
    assert_eq!(original.struct_tags, vec!["user", "user_resolvable"]);

    connect(&mut flow, trigger, "user", lookup, "user").unwrap();
    assert!(flow.connections().is_empty());
    connect(&mut flow, trigger, "user", lookup, "user").unwrap();
    assert_eq!(flow.connections(), &[original]);
}

#[test]
fn test_new_connection_supersedes_input_source() {
    let mut flow = empty_flow();
    let first = place(&mut flow, "getUsername", 0.0, 0.0);
    let second = place(&mut flow, "getUsername", 0.0, 100.0);
    let reply = place(&mut flow, "reply", 200.0, 0.0);

    connect(&mut flow, first, "username", reply, "text").unwrap();
    let outcome = connect(&mut flow, second, "username", reply, "text").unwrap();

    let ConnectionOutcome::Created { superseded, .. } = outcome else {
        panic!("expected a created connection");
    };
    assert_eq!(superseded.len(), 1);
    assert_eq!(superseded[0].from, Some(PortRef::new(first, "username")));

    assert_eq!(flow.connections().len(), 1);
    assert_eq!(
        flow.input_source(&PortRef::new(reply, "text")),
        Some(&PortRef::new(second, "username"))
    );
}

#[test]
fn test_flow_output_drives_one_connection() {
    let mut flow = empty_flow();
    let trigger = place(&mut flow, "onCommand", 0.0, 0.0);
    let a = place(&mut flow, "reply", 200.0, 0.0);
    let b = place(&mut flow, "reply", 200.0, 100.0);

    connect(&mut flow, trigger, FLOW_OUT_KEY, a, FLOW_IN_KEY).unwrap();
    connect(&mut flow, trigger, FLOW_OUT_KEY, b, FLOW_IN_KEY).unwrap();

    assert_eq!(flow.connections().len(), 1);
    assert_eq!(
        flow.flow_target(&PortRef::new(trigger, FLOW_OUT_KEY)),
        Some(&PortRef::new(b, FLOW_IN_KEY))
    );
    assert!(flow.is_consistent());
}

#[test]
fn test_data_outputs_fan_out() {
    let mut flow = empty_flow();
    let lookup = place(&mut flow, "getUsername", 0.0, 0.0);
    let a = place(&mut flow, "reply", 200.0, 0.0);
    let b = place(&mut flow, "reply", 200.0, 100.0);

    connect(&mut flow, lookup, "username", a, "text").unwrap();
    connect(&mut flow, lookup, "username", b, "text").unwrap();

    assert_eq!(flow.connections().len(), 2);
    assert_eq!(flow.outgoing(lookup).count(), 2);
    assert!(flow.is_consistent());
}

#[test]
fn test_rejections_leave_graph_unchanged() {
    let mut flow = empty_flow();
    let trigger = place(&mut flow, "onCommand", 0.0, 0.0);
    let reply = place(&mut flow, "reply", 200.0, 0.0);
    let adder = place(&mut flow, "addNumbers", 200.0, 100.0);
    let channel = place(&mut flow, "channelName", 200.0, 200.0);
    connect(&mut flow, trigger, FLOW_OUT_KEY, reply, FLOW_IN_KEY).unwrap();
    let before = flow.clone();

    assert!(matches!(
        connect(&mut flow, reply, FLOW_OUT_KEY, reply, FLOW_IN_KEY),
        Err(ConnectionRejected::SelfLoop { .. })
    ));
    assert_eq!(
        connect(&mut flow, trigger, FLOW_OUT_KEY, adder, "a").unwrap_err(),
        ConnectionRejected::IncompatiblePorts {
            output: PortType::Flow,
            input: PortType::Number,
        }
    );
    assert_eq!(
        connect(&mut flow, trigger, "user", channel, "channel").unwrap_err(),
        ConnectionRejected::MissingStructTags {
            missing: vec!["text_channel".to_string()],
        }
    );
    assert!(matches!(
        connect(&mut flow, trigger, "nope", reply, "text"),
        Err(ConnectionRejected::UnknownOutput { .. })
    ));

    let removed = flow.remove_nodes(&[adder]);
    assert_eq!(removed.len(), 1);
    assert_eq!(
        connect(&mut flow, adder, "sum", reply, "text").unwrap_err(),
        ConnectionRejected::NodeNotFound(adder)
    );

    assert_eq!(flow.connections(), before.connections());
}

#[test]
fn test_any_input_accepts_every_output() {
    let mut flow = empty_flow();
    let trigger = place(&mut flow, "onCommand", 0.0, 0.0);
    let adder = place(&mut flow, "addNumbers", 0.0, 100.0);
    let a = place(&mut flow, "toText", 200.0, 0.0);
    let b = place(&mut flow, "toText", 200.0, 100.0);

    connect(&mut flow, trigger, "user", a, "value").unwrap();
    connect(&mut flow, adder, "sum", b, "value").unwrap();
    assert_eq!(flow.connections()[0].port_type, PortType::Structure);
    assert_eq!(flow.connections()[1].port_type, PortType::Number);
}

#[test]
fn test_remove_nodes_removes_exactly_related_connections() {
    let mut flow = empty_flow();
    let trigger = place(&mut flow, "onCommand", 0.0, 0.0);
    let lookup = place(&mut flow, "getUsername", 100.0, 0.0);
    let reply = place(&mut flow, "reply", 200.0, 0.0);
    let other = place(&mut flow, "reply", 200.0, 100.0);

    connect(&mut flow, trigger, FLOW_OUT_KEY, reply, FLOW_IN_KEY).unwrap();
    connect(&mut flow, trigger, "user", lookup, "user").unwrap();
    connect(&mut flow, lookup, "username", reply, "text").unwrap();
    connect(&mut flow, reply, FLOW_OUT_KEY, other, FLOW_IN_KEY).unwrap();
    connect(&mut flow, lookup, "username", other, "text").unwrap();

    let removed = flow.remove_nodes(&[reply]);
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].id(), reply);
    assert!(flow.node(reply).is_none());

    assert_eq!(flow.connections().len(), 2);
    assert!(flow.connections().iter().all(|c| !c.touches(reply)));
    assert!(flow.connections().iter().any(|c| c.links(
        &PortRef::new(trigger, "user"),
        &PortRef::new(lookup, "user")
    )));
    assert!(flow.connections().iter().any(|c| c.links(
        &PortRef::new(lookup, "username"),
        &PortRef::new(other, "text")
    )));
}

#[test]
fn test_remove_related_connections() {
    let mut flow = empty_flow();
    let trigger = place(&mut flow, "onCommand", 0.0, 0.0);
    let reply = place(&mut flow, "reply", 200.0, 0.0);
    connect(&mut flow, trigger, FLOW_OUT_KEY, reply, FLOW_IN_KEY).unwrap();

    let removed = flow.remove_related_connections(reply);
    assert_eq!(removed.len(), 1);
    assert!(flow.connections().is_empty());
    assert_eq!(flow.nodes().len(), 2);
}

#[test]
fn test_node_handles_are_not_reused() {
    let mut flow = empty_flow();
    let first = place(&mut flow, "reply", 0.0, 0.0);
    flow.remove_nodes(&[first]);
    let second = place(&mut flow, "reply", 0.0, 0.0);
    assert_ne!(first, second);
    assert!(flow.node(first).is_none());
}

#[test]
fn test_add_node_seeds_defaults_and_uid() {
    let mut flow = empty_flow();
    let a = place(&mut flow, "reply", 10.0, 20.0);
    let b = place(&mut flow, "reply", 30.0, 40.0);

    let node = flow.node(a).unwrap();
    assert_eq!(node.type_id(), "reply");
    assert_eq!(node.position(), Position::new(10.0, 20.0));
    assert_eq!(node.hardcoded("text"), Some(&json!("")));
    assert_ne!(node.uid(), flow.node(b).unwrap().uid());
    assert_eq!(flow.node_by_uid(node.uid()).unwrap().id(), a);

    assert!(matches!(
        flow.add_node_by_id("unknown", (0.0, 0.0)),
        Err(CatalogError::NotFound(_))
    ));
}

#[test]
fn test_node_edits() {
    let mut flow = empty_flow();
    let reply = place(&mut flow, "reply", 0.0, 0.0);

    flow.move_node(reply, (50.0, 60.0)).unwrap();
    assert_eq!(flow.node(reply).unwrap().position(), Position::new(50.0, 60.0));

    let previous = flow.set_hardcoded(reply, "text", json!("hello")).unwrap();
    assert_eq!(previous, Some(json!("")));
    assert_eq!(flow.node(reply).unwrap().hardcoded("text"), Some(&json!("hello")));

    assert_eq!(
        flow.set_hardcoded(reply, "missing", json!(1)).unwrap_err(),
        GraphError::UnknownInput {
            type_id: "reply".to_string(),
            key: "missing".to_string(),
        }
    );

    assert_eq!(flow.clear_hardcoded(reply, "text").unwrap(), Some(json!("hello")));
    assert!(flow.node(reply).unwrap().hardcoded("text").is_none());

    flow.remove_nodes(&[reply]);
    assert_eq!(
        flow.move_node(reply, (0.0, 0.0)).unwrap_err(),
        GraphError::NodeNotFound(reply)
    );
}

#[test]
fn test_pending_drag_from_input_orients_candidate() {
    let mut flow = empty_flow();
    let trigger = place(&mut flow, "onCommand", 0.0, 0.0);
    let reply = place(&mut flow, "reply", 200.0, 0.0);

    let drag = PendingConnection::from_input(reply, FLOW_IN_KEY);
    let preview = drag.preview(&flow).unwrap();
    assert!(preview.is_pending());
    assert_eq!(preview.port_type, PortType::Flow);
    assert!(preview.from.is_none());

    let candidate = drag.complete(PortRef::new(trigger, FLOW_OUT_KEY));
    assert_eq!(candidate.from, PortRef::new(trigger, FLOW_OUT_KEY));
    assert_eq!(candidate.to, PortRef::new(reply, FLOW_IN_KEY));
    flow.create_or_toggle_connection(candidate).unwrap();
    assert_eq!(flow.connections().len(), 1);

    // Dragging the other way toggles the same connection off.
    let candidate = PendingConnection::from_output(trigger, FLOW_OUT_KEY)
        .complete(PortRef::new(reply, FLOW_IN_KEY));
    let outcome = flow.create_or_toggle_connection(candidate).unwrap();
    assert!(matches!(outcome, ConnectionOutcome::Removed(_)));
}

#[test]
fn test_pending_drag_preview_needs_declared_port() {
    let mut flow = empty_flow();
    let reply = place(&mut flow, "reply", 0.0, 0.0);
    assert!(PendingConnection::from_output(reply, "ghost").preview(&flow).is_none());
    assert!(PendingConnection::from_output(reply, FLOW_IN_KEY).preview(&flow).is_none());
}

#[test]
fn test_control_sequence_follows_flow_links() {
    let mut flow = empty_flow();
    let trigger = place(&mut flow, "onCommand", 0.0, 0.0);
    let first = place(&mut flow, "reply", 100.0, 0.0);
    let second = place(&mut flow, "reply", 200.0, 0.0);
    let stray = place(&mut flow, "reply", 300.0, 0.0);

    connect(&mut flow, trigger, FLOW_OUT_KEY, first, FLOW_IN_KEY).unwrap();
    connect(&mut flow, first, FLOW_OUT_KEY, second, FLOW_IN_KEY).unwrap();

    assert_eq!(flow.control_sequence(trigger), vec![trigger, first, second]);
    assert_eq!(flow.control_sequence(stray), vec![stray]);

    // Closing the loop does not make the walk run forever.
    connect(&mut flow, second, FLOW_OUT_KEY, first, FLOW_IN_KEY).unwrap();
    assert_eq!(flow.control_sequence(first), vec![first, second]);

    flow.remove_nodes(&[stray]);
    assert!(flow.control_sequence(stray).is_empty());
}

#[test]
fn test_walk_helpers() {
    let mut flow = empty_flow();
    let trigger = place(&mut flow, "onCommand", 0.0, 0.0);
    let lookup = place(&mut flow, "getUsername", 100.0, 0.0);
    let reply = place(&mut flow, "reply", 200.0, 0.0);
    connect(&mut flow, trigger, "user", lookup, "user").unwrap();
    connect(&mut flow, lookup, "username", reply, "text").unwrap();

    assert_eq!(flow.incoming(lookup).count(), 1);
    assert_eq!(flow.outgoing(lookup).count(), 1);
    assert_eq!(flow.nodes_of_type("reply").count(), 1);
    assert!(flow.input_source(&PortRef::new(reply, FLOW_IN_KEY)).is_none());
}

#[test]
fn test_available_nodes_lists_catalog() {
    let flow = empty_flow();
    let ids: Vec<&str> = flow.available_nodes().map(|d| d.id.as_str()).collect();
    assert_eq!(ids[0], "onCommand");
    assert_eq!(ids.len(), 6);
    assert_eq!(flow.fallback_type().unwrap().id, "onCommand");
}

#[test]
fn test_violations_for_fresh_flow_are_empty() {
    let mut flow = empty_flow();
    let trigger = place(&mut flow, "onCommand", 0.0, 0.0);
    let reply = place(&mut flow, "reply", 100.0, 0.0);
    connect(&mut flow, trigger, FLOW_OUT_KEY, reply, FLOW_IN_KEY).unwrap();
    assert!(flow.violations().is_empty());
}
