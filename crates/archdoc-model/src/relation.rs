//! Directed, typed edges between entities

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A directed, typed edge between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation id (`rel-*`)
    pub id: String,
    /// Source entity id (the owning entity)
    pub source: String,
    /// Target entity id, or an external name when `external` is set
    pub target: String,
    /// Relation type from the level's vocabulary
    #[serde(rename = "type")]
    pub kind: String,
    /// Edge direction, defaults to unidirectional
    #[serde(default)]
    pub direction: Direction,
    /// Human-readable description
    pub description: String,
    /// Wire protocol, when meaningful
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Marks targets outside the discovered scope; exempts the target
    /// from referential-integrity checking
    #[serde(default)]
    pub external: bool,
    /// Extra key/value details, aggregated into the rendered table
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Edge direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Unidirectional,
    Bidirectional,
}

impl Direction {
    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Unidirectional => "unidirectional",
            Direction::Bidirectional => "bidirectional",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_defaults_to_unidirectional() {
        let rel: Relation = serde_json::from_str(
            r#"{
                "id": "rel-1",
                "source": "api-gateway",
                "target": "user-service",
                "type": "http-rest",
                "description": "routes user requests"
            }"#,
        )
        .unwrap();
        assert_eq!(rel.direction, Direction::Unidirectional);
        assert!(!rel.external);
        assert!(rel.metadata.is_empty());
    }

    #[test]
    fn metadata_keys_are_sorted() {
        let rel: Relation = serde_json::from_str(
            r#"{
                "id": "rel-2",
                "source": "worker",
                "target": "queue",
                "type": "message-subscribe",
                "description": "consumes billing events",
                "protocol": "amqp",
                "metadata": {"queue": "billing", "ack": "manual"}
            }"#,
        )
        .unwrap();
        let keys: Vec<&str> = rel.metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["ack", "queue"]);
    }
}
