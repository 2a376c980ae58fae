//! The node graph model of a single command flow.
//!
//! [`NodeFlow`] owns the placed nodes and their connections and is the only
//! way to change them. Every mutating operation either succeeds with all
//! connection invariants intact or returns an error with nothing changed:
//!
//! - a node is never connected to itself;
//! - an input has at most one incoming connection;
//! - a flow output drives at most one connection;
//! - connected ports have compatible types and struct tags.

pub mod connection;
pub mod diagnostics;
pub mod flow;
pub mod node;
pub mod pending;
pub mod walk;

pub use connection::*;
pub use diagnostics::Violation;
pub use flow::NodeFlow;
pub use node::*;
pub use pending::*;
