//! Observations attached to entities

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Minimum description length before a short-description warning fires
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// A categorized, evidenced finding attached to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation id (`obs-*`)
    pub id: String,
    /// Category from the level's vocabulary
    pub category: String,
    /// Severity, defaults to `info`
    #[serde(default)]
    pub severity: Severity,
    /// Human-readable description
    pub description: String,
    /// Supporting evidence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,
    /// Free-form tags rendered as inline badges
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Remediation hint; expected (as a lint) on critical observations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Observation severity
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    #[default]
    Info,
    /// Needs attention
    Warning,
    /// Needs remediation
    Critical,
}

impl Severity {
    /// Rendering rank: critical first, info last
    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Warning => 1,
            Severity::Info => 2,
        }
    }

    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed evidence supporting an observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Kind of evidence
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    /// Where the evidence was found (file path, config key, metric name)
    pub location: String,
    /// Optional verbatim excerpt, rendered as a fenced block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Evidence kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    File,
    Code,
    Config,
    Metric,
    Pattern,
}

impl EvidenceKind {
    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EvidenceKind::File => "file",
            EvidenceKind::Code => "code",
            EvidenceKind::Config => "config",
            EvidenceKind::Metric => "metric",
            EvidenceKind::Pattern => "pattern",
        }
    }
}
