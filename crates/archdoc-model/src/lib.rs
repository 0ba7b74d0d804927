//! Archdoc data model
//!
//! Typed documents, entities, observations, relations and findings for the
//! architecture discovery pipeline.
//!
//! # Core concepts
//!
//! - [`Document`]: one of four tagged document kinds (inventory, systems,
//!   containers, components), materialized only after schema validation
//! - [`EntityRef`]: borrowed view over a renderable entity
//! - [`Finding`]: a validation result with path, message and severity
//! - [`Level`]: the four-level hierarchy and its parent relationships
//! - [`vocab`]: the closed per-level vocabularies

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod document;
mod entity;
mod finding;
mod level;
mod metadata;
mod observation;
mod relation;
pub mod vocab;

pub use document::{
    ComponentDocument, ContainerDocument, Document, InventoryDocument, SystemDocument,
};
pub use entity::{
    CodeStructure, Component, Container, DesignPattern, EntityRef, ExportedSymbol, Library,
    Manifest, Metrics, Repository, Runtime, SourceFile, System, Technology,
};
pub use finding::{exit_code, max_severity, Finding, FindingSeverity};
pub use level::Level;
pub use metadata::{
    format_timestamp, DocumentMetadata, SchemaVersion, VersionError, SUPPORTED_SCHEMA_VERSION,
};
pub use observation::{Evidence, EvidenceKind, Observation, Severity, MIN_DESCRIPTION_LEN};
pub use relation::{Direction, Relation};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
