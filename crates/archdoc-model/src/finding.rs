//! Validation findings and the run-level exit contract

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::level::Level;

/// Finding severity
///
/// `Blocking` halts the document's chain; `Warning` is carried into the
/// summary without changing control flow. Ordering matters: the run result
/// is the maximum severity observed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Warning,
    Blocking,
}

impl FindingSeverity {
    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FindingSeverity::Warning => "warning",
            FindingSeverity::Blocking => "blocking",
        }
    }
}

impl Display for FindingSeverity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: FindingSeverity,
    /// Document level the finding was raised on
    pub level: Level,
    /// Entity id, when the finding is entity-scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Dotted location of the offending field, e.g.
    /// `systems[2].observations[0].severity`
    pub path: String,
    /// Human-readable message
    pub message: String,
}

impl Finding {
    /// Create a blocking finding
    #[inline]
    #[must_use]
    pub fn blocking(level: Level, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: FindingSeverity::Blocking,
            level,
            entity: None,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a warning finding
    #[inline]
    #[must_use]
    pub fn warning(level: Level, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: FindingSeverity::Warning,
            level,
            entity: None,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Attach the owning entity id
    #[inline]
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Whether this finding halts the chain
    #[inline]
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.severity == FindingSeverity::Blocking
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at {}: {}",
            self.severity.as_str().to_uppercase(),
            self.level,
            self.path,
            self.message
        )?;
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {entity})")?;
        }
        Ok(())
    }
}

/// Worst severity across a set of findings, if any
#[must_use]
pub fn max_severity<'a, I>(findings: I) -> Option<FindingSeverity>
where
    I: IntoIterator<Item = &'a Finding>,
{
    findings.into_iter().map(|f| f.severity).max()
}

/// Three-tier process exit contract
///
/// `0` = no findings, `1` = warnings only, `2` = at least one blocking
/// finding. Computed across the whole run, never per file.
#[must_use]
pub fn exit_code<'a, I>(findings: I) -> i32
where
    I: IntoIterator<Item = &'a Finding>,
{
    match max_severity(findings) {
        None => 0,
        Some(FindingSeverity::Warning) => 1,
        Some(FindingSeverity::Blocking) => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocking_outranks_warning() {
        assert!(FindingSeverity::Blocking > FindingSeverity::Warning);
    }

    #[test]
    fn exit_code_tiers() {
        let none: Vec<Finding> = vec![];
        assert_eq!(exit_code(&none), 0);

        let warnings = vec![Finding::warning(Level::System, "systems", "short description")];
        assert_eq!(exit_code(&warnings), 1);

        let mixed = vec![
            Finding::warning(Level::System, "systems", "short description"),
            Finding::blocking(Level::Container, "containers[0].system_id", "dangling"),
        ];
        assert_eq!(exit_code(&mixed), 2);
    }

    #[test]
    fn finding_display_includes_entity() {
        let finding = Finding::blocking(Level::Container, "containers[0].system_id", "not found")
            .with_entity("billing-api");
        let text = finding.to_string();
        assert!(text.contains("BLOCKING"));
        assert!(text.contains("billing-api"));
    }
}
