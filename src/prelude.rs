//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the disbotter-flow
//! crate. Import it to get the catalog, graph, command, and codec types without
//! naming each module.
//!
//! # Example
//!
//! ```rust,no_run
//! use disbotter_flow::prelude::*;
//! use std::sync::Arc;
//!
//! # fn run_example() -> Result<()> {
//! let feed = std::fs::read_to_string("path/to/nodes.json")?;
//! let project_json = std::fs::read_to_string("path/to/bot.dbp")?;
//!
//! let decoder = Decoder::new(Arc::new(Catalog::from_feed_str(&feed)?));
//! let project = decoder.parse_project(&project_json)?;
//!
//! for command in project.commands() {
//!     println!("/{}: {} node(s)", command.name, command.flow().nodes().len());
//! }
//! # Ok(())
//! # }
//! ```

// Catalog
pub use crate::catalog::{
    Catalog, CatalogState, FLOW_IN_KEY, FLOW_OUT_KEY, NodeTypeDescriptor, PortDeclaration,
};

// Graph model
pub use crate::graph::{
    Connection, ConnectionCandidate, ConnectionOutcome, NodeFlow, NodeId, NodeInstance,
    PendingConnection, PortRef, Position, Violation,
};
pub use crate::port::{PortSpec, PortType};

// Commands and projects
pub use crate::command::{Command, CommandOption, CommandOptionType};
pub use crate::project::Project;

// Serialization
pub use crate::codec::{Decoder, MissingTypePolicy, to_json_string};

// Error types
pub use crate::error::{
    CatalogError, CodecError, ConnectionRejected, GraphError, OptionError, ProjectError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
