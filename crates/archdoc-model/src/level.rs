//! Discovery levels
//!
//! The pipeline processes exactly four document levels, each depending on
//! the previous one: repository inventory, systems (C1), containers (C2)
//! and components (C3).

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// One of the four discovery levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    /// Repository inventory (no parent)
    Inventory,
    /// C1 systems
    System,
    /// C2 containers
    Container,
    /// C3 components
    Component,
}

impl Level {
    /// All levels in processing order
    pub const ALL: [Level; 4] = [
        Level::Inventory,
        Level::System,
        Level::Container,
        Level::Component,
    ];

    /// Short code used in frontmatter, change records and output paths
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Level::Inventory => "inventory",
            Level::System => "c1",
            Level::Container => "c2",
            Level::Component => "c3",
        }
    }

    /// Name of the level-specific top-level array in the document JSON
    #[inline]
    #[must_use]
    pub const fn array_field(self) -> &'static str {
        match self {
            Level::Inventory => "repositories",
            Level::System => "systems",
            Level::Container => "containers",
            Level::Component => "components",
        }
    }

    /// The level this one depends on, if any
    #[inline]
    #[must_use]
    pub const fn parent(self) -> Option<Level> {
        match self {
            Level::Inventory => None,
            Level::System => Some(Level::Inventory),
            Level::Container => Some(Level::System),
            Level::Component => Some(Level::Container),
        }
    }

    /// Name of the entity field pointing into the parent level, if any
    #[inline]
    #[must_use]
    pub const fn parent_ref_field(self) -> Option<&'static str> {
        match self {
            Level::Container => Some("system_id"),
            Level::Component => Some("container_id"),
            _ => None,
        }
    }

    /// Whether this level carries renderable entities
    ///
    /// The inventory is validated but never rendered; only systems,
    /// containers and components produce markdown.
    #[inline]
    #[must_use]
    pub const fn is_renderable(self) -> bool {
        !matches!(self, Level::Inventory)
    }

    /// Parse a level code (`inventory`, `c1`, `c2`, `c3`)
    #[must_use]
    pub fn from_code(code: &str) -> Option<Level> {
        Level::ALL.into_iter().find(|l| l.code() == code)
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<String> for Level {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Level::from_code(&value).ok_or_else(|| format!("unknown level code: {value}"))
    }
}

impl From<Level> for String {
    fn from(level: Level) -> String {
        level.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_codes_round_trip() {
        for level in Level::ALL {
            assert_eq!(Level::from_code(level.code()), Some(level));
        }
        assert_eq!(Level::from_code("c4"), None);
    }

    #[test]
    fn level_parent_chain() {
        assert_eq!(Level::Inventory.parent(), None);
        assert_eq!(Level::System.parent(), Some(Level::Inventory));
        assert_eq!(Level::Container.parent(), Some(Level::System));
        assert_eq!(Level::Component.parent(), Some(Level::Container));
    }

    #[test]
    fn parent_ref_fields() {
        assert_eq!(Level::Container.parent_ref_field(), Some("system_id"));
        assert_eq!(Level::Component.parent_ref_field(), Some("container_id"));
        assert_eq!(Level::System.parent_ref_field(), None);
    }

    #[test]
    fn inventory_is_not_renderable() {
        assert!(!Level::Inventory.is_renderable());
        assert!(Level::System.is_renderable());
    }

    #[test]
    fn level_serde_uses_codes() {
        let json = serde_json::to_string(&Level::Container).unwrap();
        assert_eq!(json, "\"c2\"");
        let back: Level = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Level::Container);
    }
}
