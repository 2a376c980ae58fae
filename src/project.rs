//! The project aggregate: all commands of a bot and the editor's focus.

use crate::catalog::{Catalog, CatalogState};
use crate::command::Command;
use crate::error::ProjectError;
use crate::graph::{NodeFlow, NodeId, NodeInstance, Position};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    commands: Vec<Command>,
    editing: Option<String>,
    catalog: CatalogState,
}

impl Project {
    /// An empty project waiting for its node catalog.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_parts(name.into(), Vec::new(), CatalogState::Pending)
    }

    pub fn with_catalog(name: impl Into<String>, catalog: Arc<Catalog>) -> Self {
        Self::from_parts(name.into(), Vec::new(), CatalogState::Ready(catalog))
    }

    pub(crate) fn from_parts(name: String, commands: Vec<Command>, catalog: CatalogState) -> Self {
        Self {
            name,
            commands,
            editing: None,
            catalog,
        }
    }

    pub fn catalog_state(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn is_catalog_ready(&self) -> bool {
        self.catalog.is_ready()
    }

    /// Makes `catalog` the shared catalog of every command.
    ///
    /// Each flow is rebound: nodes are re-resolved by type id and connections
    /// that no longer fit their ports are dropped. Returns how many
    /// connections were dropped across the project.
    pub fn publish_catalog(&mut self, catalog: Arc<Catalog>) -> usize {
        let mut dropped = 0;
        for command in &mut self.commands {
            dropped += command.flow_mut().rebind_catalog(Arc::clone(&catalog)).len();
        }
        debug!(
            node_types = catalog.len(),
            commands = self.commands.len(),
            dropped,
            "Published node catalog"
        );
        self.catalog = CatalogState::Ready(catalog);
        dropped
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn command(&self, uid: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.uid() == uid)
    }

    pub fn command_mut(&mut self, uid: &str) -> Option<&mut Command> {
        self.commands.iter_mut().find(|c| c.uid() == uid)
    }

    /// Creates an empty command bound to the current catalog and starts
    /// editing it.
    pub fn create_command(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> &mut Command {
        let command = Command::new(name, description, self.catalog.snapshot());
        self.add_command(command)
    }

    /// Appends a command and starts editing it.
    pub fn add_command(&mut self, command: Command) -> &mut Command {
        debug!(command = command.uid(), name = command.name.as_str(), "Added command");
        self.editing = Some(command.uid().to_string());
        self.commands.push(command);
        let last = self.commands.len() - 1;
        &mut self.commands[last]
    }

    pub fn delete_command(&mut self, uid: &str) -> Result<Command, ProjectError> {
        let index = self
            .commands
            .iter()
            .position(|c| c.uid() == uid)
            .ok_or_else(|| ProjectError::CommandNotFound(uid.to_string()))?;
        if self.is_editing(uid) {
            self.editing = None;
        }
        debug!(command = uid, "Deleted command");
        Ok(self.commands.remove(index))
    }

    /// Points the editor at a command, or at nothing.
    pub fn set_editing(&mut self, uid: Option<&str>) -> Result<(), ProjectError> {
        if let Some(uid) = uid {
            if self.command(uid).is_none() {
                return Err(ProjectError::CommandNotFound(uid.to_string()));
            }
        }
        self.editing = uid.map(str::to_string);
        Ok(())
    }

    pub fn is_editing(&self, uid: &str) -> bool {
        self.editing.as_deref() == Some(uid)
    }

    pub fn editing(&self) -> Option<&Command> {
        self.editing.as_deref().and_then(|uid| self.command(uid))
    }

    pub fn editing_mut(&mut self) -> Option<&mut Command> {
        let uid = self.editing.clone()?;
        self.command_mut(&uid)
    }

    pub fn current_flow(&self) -> Option<&NodeFlow> {
        self.editing().map(Command::flow)
    }

    pub fn current_flow_mut(&mut self) -> Option<&mut NodeFlow> {
        self.editing_mut().map(Command::flow_mut)
    }

    /// Places a node in the flow being edited.
    pub fn add_node(
        &mut self,
        type_id: &str,
        position: impl Into<Position>,
    ) -> Result<NodeId, ProjectError> {
        let flow = self.current_flow_mut().ok_or(ProjectError::NoCommandEditing)?;
        Ok(flow.add_node_by_id(type_id, position)?)
    }

    /// Removes nodes from the flow being edited.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> Result<Vec<NodeInstance>, ProjectError> {
        let flow = self.current_flow_mut().ok_or(ProjectError::NoCommandEditing)?;
        Ok(flow.remove_nodes(ids))
    }
}
