//! The node type catalog: every node type a flow may place.
//!
//! A [`Catalog`] is loaded from the declaration feed and then shared, read-only,
//! by all commands of a project. Each flow also owns a second, small catalog
//! holding the synthetic entries derived from its command's options.

pub mod descriptor;
pub mod feed;

pub use descriptor::*;
pub use feed::{descriptor_from_value, parse_feed};

use crate::error::CatalogError;
use ahash::AHashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry of node type descriptors in registration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Arc<NodeTypeDescriptor>>,
    index: AHashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from descriptors, failing on the first duplicate id.
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = NodeTypeDescriptor>,
    {
        let mut catalog = Catalog::new();
        for descriptor in descriptors {
            catalog.register(descriptor)?;
        }
        Ok(catalog)
    }

    /// Loads a catalog from a declaration feed. Malformed entries and repeated
    /// ids are skipped with a warning.
    pub fn from_feed_str(json: &str) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::new();
        for descriptor in parse_feed(json)? {
            if let Err(e) = catalog.register(descriptor) {
                warn!(error = %e, "Skipping node declaration");
            }
        }
        debug!(node_types = catalog.len(), "Loaded node declaration feed");
        Ok(catalog)
    }

    pub fn lookup(&self, id: &str) -> Result<&Arc<NodeTypeDescriptor>, CatalogError> {
        self.get(id).ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&Arc<NodeTypeDescriptor>> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// The entry used when a referenced type cannot be resolved.
    pub fn first(&self) -> Option<&Arc<NodeTypeDescriptor>> {
        self.entries.first()
    }

    pub fn register(
        &mut self,
        descriptor: NodeTypeDescriptor,
    ) -> Result<Arc<NodeTypeDescriptor>, CatalogError> {
        if self.contains(&descriptor.id) {
            return Err(CatalogError::DuplicateId(descriptor.id));
        }
        let descriptor = Arc::new(descriptor);
        self.index.insert(descriptor.id.clone(), self.entries.len());
        self.entries.push(Arc::clone(&descriptor));
        Ok(descriptor)
    }

    pub fn unregister(&mut self, id: &str) -> Result<Arc<NodeTypeDescriptor>, CatalogError> {
        let position = self
            .index
            .remove(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        let removed = self.entries.remove(position);
        self.reindex();
        Ok(removed)
    }

    /// Redefines the entry `old_id` in place, keeping its position. The new
    /// descriptor may carry a different id as long as no other entry owns it.
    pub fn replace(
        &mut self,
        old_id: &str,
        descriptor: NodeTypeDescriptor,
    ) -> Result<Arc<NodeTypeDescriptor>, CatalogError> {
        let position = *self
            .index
            .get(old_id)
            .ok_or_else(|| CatalogError::NotFound(old_id.to_string()))?;
        if descriptor.id != old_id && self.contains(&descriptor.id) {
            return Err(CatalogError::DuplicateId(descriptor.id));
        }
        let descriptor = Arc::new(descriptor);
        self.entries[position] = Arc::clone(&descriptor);
        self.reindex();
        Ok(descriptor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<NodeTypeDescriptor>> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|d| d.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i))
            .collect();
    }
}

/// Whether the shared catalog has been published yet.
///
/// The declaration feed arrives out of band; until it does, commands can be
/// created but only their option nodes are placeable.
#[derive(Debug, Clone, Default)]
pub enum CatalogState {
    #[default]
    Pending,
    Ready(Arc<Catalog>),
}

impl CatalogState {
    pub fn is_ready(&self) -> bool {
        matches!(self, CatalogState::Ready(_))
    }

    pub fn catalog(&self) -> Option<&Arc<Catalog>> {
        match self {
            CatalogState::Ready(catalog) => Some(catalog),
            CatalogState::Pending => None,
        }
    }

    /// The published catalog, or an empty one while pending.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.catalog()
            .cloned()
            .unwrap_or_else(|| Arc::new(Catalog::new()))
    }
}
