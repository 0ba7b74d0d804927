//! Entity records for the four levels
//!
//! Repositories live in the inventory and are validated but never
//! rendered; systems, containers and components are the renderable
//! entities the rest of the pipeline operates on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::level::Level;
use crate::observation::Observation;
use crate::relation::Relation;

/// A scanned repository in the inventory document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    /// Absolute path on the scanning machine
    pub path: String,
    /// Package manifests discovered inside the repository
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manifests: Vec<Manifest>,
}

/// A package manifest inside a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest type from [`crate::vocab::MANIFEST_TYPES`]
    #[serde(rename = "type")]
    pub kind: String,
    /// Path relative to the repository root
    pub path: String,
    /// Raw manifest payload as captured by the Explorer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A C1 system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    /// Inventory repository names this system spans
    pub repositories: Vec<String>,
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// A C2 container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Owning system id (must exist at C1)
    pub system_id: String,
    pub description: String,
    pub technology: Technology,
    pub runtime: Runtime,
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// Container technology stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub primary_language: String,
    pub framework: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<Library>,
}

/// One library in a container's technology table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

/// Container runtime environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runtime {
    /// One of [`crate::vocab::RUNTIME_ENVIRONMENTS`]
    pub environment: String,
    pub platform: String,
    pub containerized: bool,
    /// Required when `containerized` is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_technology: Option<String>,
}

/// A C3 component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Owning container id (must exist at C2)
    pub container_id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<CodeStructure>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<DesignPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// Source layout of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeStructure {
    pub path: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<SourceFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<ExportedSymbol>,
}

/// One file inside a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    #[serde(default)]
    pub lines: u64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One exported symbol of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedSymbol {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A recognized design pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignPattern {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Component-level code metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_of_code: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cyclomatic_complexity: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_coverage: Option<f64>,
}

/// Borrowed view over any renderable entity
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    System(&'a System),
    Container(&'a Container),
    Component(&'a Component),
}

impl<'a> EntityRef<'a> {
    /// Entity id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &'a str {
        match self {
            EntityRef::System(s) => &s.id,
            EntityRef::Container(c) => &c.id,
            EntityRef::Component(c) => &c.id,
        }
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'a str {
        match self {
            EntityRef::System(s) => &s.name,
            EntityRef::Container(c) => &c.name,
            EntityRef::Component(c) => &c.name,
        }
    }

    /// Entity type string
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'a str {
        match self {
            EntityRef::System(s) => &s.kind,
            EntityRef::Container(c) => &c.kind,
            EntityRef::Component(c) => &c.kind,
        }
    }

    /// Level this entity belongs to
    #[inline]
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            EntityRef::System(_) => Level::System,
            EntityRef::Container(_) => Level::Container,
            EntityRef::Component(_) => Level::Component,
        }
    }

    /// Attached observations
    #[inline]
    #[must_use]
    pub fn observations(&self) -> &'a [Observation] {
        match self {
            EntityRef::System(s) => &s.observations,
            EntityRef::Container(c) => &c.observations,
            EntityRef::Component(c) => &c.observations,
        }
    }

    /// Attached relations
    #[inline]
    #[must_use]
    pub fn relations(&self) -> &'a [Relation] {
        match self {
            EntityRef::System(s) => &s.relations,
            EntityRef::Container(c) => &c.relations,
            EntityRef::Component(c) => &c.relations,
        }
    }

    /// Parent reference (field name, referenced id), when the level has one
    #[inline]
    #[must_use]
    pub fn parent_ref(&self) -> Option<(&'static str, &'a str)> {
        match self {
            EntityRef::System(_) => None,
            EntityRef::Container(c) => Some(("system_id", c.system_id.as_str())),
            EntityRef::Component(c) => Some(("container_id", c.container_id.as_str())),
        }
    }

    /// Serialize the underlying entity to a JSON value
    ///
    /// # Errors
    /// Returns an error when serde serialization fails.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            EntityRef::System(s) => serde_json::to_value(s),
            EntityRef::Container(c) => serde_json::to_value(c),
            EntityRef::Component(c) => serde_json::to_value(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_container() -> Container {
        serde_json::from_str(
            r#"{
                "id": "billing-api",
                "name": "Billing API",
                "type": "api",
                "system_id": "billing",
                "description": "REST surface for invoicing",
                "technology": {"primary_language": "rust", "framework": "axum"},
                "runtime": {"environment": "cloud", "platform": "linux", "containerized": true,
                            "container_technology": "docker"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn entity_ref_accessors() {
        let container = sample_container();
        let entity = EntityRef::Container(&container);
        assert_eq!(entity.id(), "billing-api");
        assert_eq!(entity.level(), Level::Container);
        assert_eq!(entity.parent_ref(), Some(("system_id", "billing")));
        assert!(entity.observations().is_empty());
    }

    #[test]
    fn entity_to_value_keeps_type_field() {
        let container = sample_container();
        let value = EntityRef::Container(&container).to_value().unwrap();
        assert_eq!(value["type"], "api");
        assert_eq!(value["runtime"]["containerized"], true);
    }
}
