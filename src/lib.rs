//! # disbotter-flow - Node Flow Graph Engine for Discord Bot Commands
//!
//! **disbotter-flow** is the model behind a visual bot builder: every slash
//! command of a bot is handled by a node graph, and this crate owns that graph.
//! It knows which node types exist, which ports may be wired together, how a
//! command's options appear as nodes, and how a whole project is saved to and
//! loaded from a `.dbp` file.
//!
//! ## Core Workflow
//!
//! 1.  **Load the node catalog**: Parse the node declaration feed into a [`catalog::Catalog`]
//!     and share it with an `Arc`.
//! 2.  **Build commands**: Create commands on a [`project::Project`], add options, place
//!     nodes, and connect ports through [`graph::NodeFlow`]. Every mutation keeps the
//!     connection invariants; a rejected edit changes nothing.
//! 3.  **Save and load**: Encode the project with [`codec::to_json_string`] and rebuild
//!     it with a [`codec::Decoder`], which degrades gracefully on unknown node types
//!     and dangling references.
//! 4.  **Hand off**: Code generators walk the finished flows with the helpers in
//!     [`graph::walk`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use disbotter_flow::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     // 1. Load the node declaration feed.
//!     let feed = std::fs::read_to_string("data/nodes.json")?;
//!     let catalog = Arc::new(Catalog::from_feed_str(&feed)?);
//!
//!     // 2. Create a command and wire its trigger to a reply.
//!     let mut project = Project::with_catalog("My Bot", Arc::clone(&catalog));
//!     let command = project.create_command("ping", "Replies with pong");
//!     let flow = command.flow_mut();
//!     let trigger = flow.add_node_by_id("onCommand", (0.0, 0.0))?;
//!     let reply = flow.add_node_by_id("reply", (240.0, 0.0))?;
//!     flow.set_hardcoded(reply, "text", serde_json::json!("pong"))?;
//!     flow.create_or_toggle_connection(ConnectionCandidate::new(
//!         trigger,
//!         FLOW_OUT_KEY,
//!         reply,
//!         FLOW_IN_KEY,
//!     ))?;
//!
//!     // 3. Save and load it again.
//!     let json = to_json_string(&project)?;
//!     let restored = Decoder::new(catalog).parse_project(&json)?;
//!     println!("Restored {} command(s)", restored.commands().len());
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod codec;
pub mod command;
pub mod error;
pub mod graph;
pub mod port;
pub mod prelude;
pub mod project;
