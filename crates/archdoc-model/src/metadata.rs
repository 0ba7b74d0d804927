//! Document metadata and schema version handling

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Schema major version this pipeline understands
pub const SUPPORTED_SCHEMA_VERSION: SchemaVersion = SchemaVersion {
    major: 1,
    minor: 0,
    patch: 0,
};

/// Metadata block common to all four document kinds
///
/// `parent_timestamp` is absent only on the inventory document; every other
/// level must declare the timestamp of the document it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Semver schema version (`major.minor.patch`)
    pub schema_version: String,
    /// Identifier of the producing tool
    pub generator: String,
    /// Generation instant (ISO-8601, millisecond precision, UTC)
    pub timestamp: DateTime<Utc>,
    /// Declared timestamp of the parent document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_timestamp: Option<DateTime<Utc>>,
}

/// Three dot-separated non-negative integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    /// Create a new version triple
    #[inline]
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let mut next = || -> Result<u32, VersionError> {
            parts
                .next()
                .ok_or_else(|| VersionError::Malformed(s.to_string()))?
                .parse::<u32>()
                .map_err(|_| VersionError::Malformed(s.to_string()))
        };
        let version = SchemaVersion::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(VersionError::Malformed(s.to_string()));
        }
        Ok(version)
    }
}

/// Schema version parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Not three dot-separated non-negative integers
    #[error("malformed schema version: {0}")]
    Malformed(String),
}

/// Format an instant the way document timestamps are written
///
/// ISO-8601 with exactly three fractional digits and a `Z` suffix, e.g.
/// `2026-03-01T12:00:00.000Z`.
#[inline]
#[must_use]
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn schema_version_parses() {
        let v: SchemaVersion = "1.2.3".parse().unwrap();
        assert_eq!(v, SchemaVersion::new(1, 2, 3));
        assert_eq!(v.to_string(), "1.2.3");
    }

    #[test]
    fn schema_version_rejects_garbage() {
        assert!("1.2".parse::<SchemaVersion>().is_err());
        assert!("1.2.3.4".parse::<SchemaVersion>().is_err());
        assert!("1.x.3".parse::<SchemaVersion>().is_err());
        assert!("-1.0.0".parse::<SchemaVersion>().is_err());
        assert!("".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn timestamp_format_has_millis_and_z() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp(instant), "2026-03-01T12:00:00.000Z");
    }

    #[test]
    fn metadata_deserializes_without_parent() {
        let meta: DocumentMetadata = serde_json::from_str(
            r#"{
                "schema_version": "1.0.0",
                "generator": "explorer",
                "timestamp": "2026-03-01T12:00:00.000Z"
            }"#,
        )
        .unwrap();
        assert_eq!(meta.generator, "explorer");
        assert!(meta.parent_timestamp.is_none());
    }
}
