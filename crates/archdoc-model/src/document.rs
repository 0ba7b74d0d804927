//! The four document kinds
//!
//! Documents are read-only inputs produced by the Explorer; the pipeline
//! never mutates them. Typed documents are only materialized after the
//! schema validator has passed over the raw JSON.

use serde::{Deserialize, Serialize};

use crate::entity::{Component, Container, EntityRef, Repository, System};
use crate::level::Level;
use crate::metadata::DocumentMetadata;

/// Repository inventory (level `inventory`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryDocument {
    pub metadata: DocumentMetadata,
    pub repositories: Vec<Repository>,
}

/// System set (level `c1`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemDocument {
    pub metadata: DocumentMetadata,
    pub systems: Vec<System>,
}

/// Container set (level `c2`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDocument {
    pub metadata: DocumentMetadata,
    pub containers: Vec<Container>,
}

/// Component set (level `c3`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDocument {
    pub metadata: DocumentMetadata,
    pub components: Vec<Component>,
}

/// One validated discovery document of any level
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Inventory(InventoryDocument),
    Systems(SystemDocument),
    Containers(ContainerDocument),
    Components(ComponentDocument),
}

impl Document {
    /// Level of this document
    #[inline]
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            Document::Inventory(_) => Level::Inventory,
            Document::Systems(_) => Level::System,
            Document::Containers(_) => Level::Container,
            Document::Components(_) => Level::Component,
        }
    }

    /// Shared metadata block
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &DocumentMetadata {
        match self {
            Document::Inventory(d) => &d.metadata,
            Document::Systems(d) => &d.metadata,
            Document::Containers(d) => &d.metadata,
            Document::Components(d) => &d.metadata,
        }
    }

    /// Ids of all entities in this document
    ///
    /// For the inventory these are repository names, which is what
    /// system `repositories` arrays reference.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<&str> {
        match self {
            Document::Inventory(d) => d.repositories.iter().map(|r| r.name.as_str()).collect(),
            Document::Systems(d) => d.systems.iter().map(|s| s.id.as_str()).collect(),
            Document::Containers(d) => d.containers.iter().map(|c| c.id.as_str()).collect(),
            Document::Components(d) => d.components.iter().map(|c| c.id.as_str()).collect(),
        }
    }

    /// Borrowed views over all renderable entities (empty for the inventory)
    #[must_use]
    pub fn entities(&self) -> Vec<EntityRef<'_>> {
        match self {
            Document::Inventory(_) => Vec::new(),
            Document::Systems(d) => d.systems.iter().map(EntityRef::System).collect(),
            Document::Containers(d) => d.containers.iter().map(EntityRef::Container).collect(),
            Document::Components(d) => d.components.iter().map(EntityRef::Component).collect(),
        }
    }
}
