//! Commands and the binding between their options and the flow.
//!
//! Every option of a command is exposed to its flow as a synthetic node type
//! `__option_get_<name>__` with a single `value` output. The binding keeps
//! those entries, the nodes placed from them, and their connections in step
//! with the option list as options are added, edited, and removed.

pub mod option;

pub use option::*;

use crate::catalog::Catalog;
use crate::error::OptionError;
use crate::graph::{NodeFlow, NodeId, new_uid};
use std::sync::Arc;
use tracing::debug;

/// A slash command: its options and the flow that handles it.
#[derive(Debug, Clone)]
pub struct Command {
    uid: String,
    pub name: String,
    pub description: String,
    options: Vec<CommandOption>,
    flow: NodeFlow,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self::from_parts(new_uid(), name.into(), description.into(), NodeFlow::new(catalog))
    }

    pub(crate) fn from_parts(
        uid: String,
        name: String,
        description: String,
        flow: NodeFlow,
    ) -> Self {
        Self {
            uid,
            name,
            description,
            options: Vec::new(),
            flow,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }

    pub fn option(&self, name: &str) -> Option<&CommandOption> {
        self.options.iter().find(|o| o.name == name)
    }

    pub fn flow(&self) -> &NodeFlow {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut NodeFlow {
        &mut self.flow
    }

    /// Adds an option and registers its node type.
    ///
    /// If the option's node type id is already taken, the name gets the first
    /// free numeric suffix (`name1`, `name2`, ...). Returns the name actually
    /// used.
    pub fn add_option(&mut self, mut option: CommandOption) -> Result<String, OptionError> {
        let base_name = option.name.clone();
        let mut suffix = 1;
        while self.type_id_taken(&option.node_type_id()) {
            option.name = format!("{}{}", base_name, suffix);
            suffix += 1;
        }

        self.flow.option_nodes.register(option.node_type())?;
        debug!(command = self.uid.as_str(), option = option.name.as_str(), "Added option");

        let name = option.name.clone();
        self.options.push(option);
        Ok(name)
    }

    /// Removes an option, its node type, and every node placed from it along
    /// with their connections.
    pub fn remove_option(&mut self, name: &str) -> Result<CommandOption, OptionError> {
        let index = self.option_index(name)?;
        let type_id = option_node_type_id(name);
        self.flow.option_nodes.unregister(&type_id)?;

        let nodes: Vec<NodeId> = self.flow.nodes_of_type(&type_id).map(|n| n.id()).collect();
        self.flow.remove_nodes(&nodes);

        debug!(command = self.uid.as_str(), option = name, nodes = nodes.len(), "Removed option");
        Ok(self.options.remove(index))
    }

    /// Replaces the option called `old_name` with `updated`.
    ///
    /// Fails with `NameConflict`, changing nothing, when the new name's node
    /// type id belongs to another entry. Otherwise the node type is redefined
    /// in place and connections out of its nodes are re-checked; those no
    /// longer compatible with their target are dropped.
    pub fn update_option(
        &mut self,
        old_name: &str,
        updated: CommandOption,
    ) -> Result<(), OptionError> {
        let index = self.option_index(old_name)?;
        let old_id = option_node_type_id(old_name);
        let new_id = updated.node_type_id();
        if new_id != old_id && self.type_id_taken(&new_id) {
            return Err(OptionError::NameConflict {
                name: updated.name,
                type_id: new_id,
            });
        }

        let descriptor = self.flow.option_nodes.replace(&old_id, updated.node_type())?;
        let retargeted = self.flow.retarget_nodes(&old_id, &descriptor);
        let dropped = self.flow.revalidate_connections(|c| {
            c.from
                .as_ref()
                .is_some_and(|from| retargeted.contains(&from.node))
        });

        debug!(
            command = self.uid.as_str(),
            from = old_name,
            to = updated.name.as_str(),
            dropped = dropped.len(),
            "Updated option"
        );
        self.options[index] = updated;
        Ok(())
    }

    fn option_index(&self, name: &str) -> Result<usize, OptionError> {
        self.options
            .iter()
            .position(|o| o.name == name)
            .ok_or_else(|| OptionError::NotFound(name.to_string()))
    }

    fn type_id_taken(&self, type_id: &str) -> bool {
        self.flow.option_nodes.contains(type_id) || self.flow.catalog.contains(type_id)
    }
}
