//! Timestamp ordering across the document chain
//!
//! Each level must be generated strictly after its parent, and the
//! `parent_timestamp` a child declares must match the parent's recorded
//! `timestamp` exactly. Clock skew against wall time is tolerated up to a
//! configurable window.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use archdoc_model::{format_timestamp, DocumentMetadata, Finding, Level};

/// Default tolerance for timestamps ahead of wall time
pub const DEFAULT_SKEW_TOLERANCE_SECS: i64 = 60;

/// Checks generation-time ordering between a document and its parent
#[derive(Debug, Clone, Copy)]
pub struct TimestampOrderer {
    skew_tolerance: Duration,
}

impl TimestampOrderer {
    /// Orderer with the default skew tolerance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            skew_tolerance: Duration::seconds(DEFAULT_SKEW_TOLERANCE_SECS),
        }
    }

    /// Orderer with a custom skew tolerance in seconds
    #[inline]
    #[must_use]
    pub fn with_tolerance_secs(secs: i64) -> Self {
        Self {
            skew_tolerance: Duration::seconds(secs),
        }
    }

    /// Check one document's metadata against its parent's recorded
    /// timestamp and the current wall time
    ///
    /// `parent_timestamp` is the `timestamp` recorded in the parent
    /// document itself, `None` at the inventory level.
    #[must_use]
    pub fn check(
        &self,
        level: Level,
        metadata: &DocumentMetadata,
        parent_timestamp: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();

        if let Some(parent) = parent_timestamp {
            match metadata.parent_timestamp {
                None => findings.push(Finding::blocking(
                    level,
                    "metadata.parent_timestamp",
                    "missing parent_timestamp while a parent document exists",
                )),
                Some(declared) if declared != parent => findings.push(Finding::blocking(
                    level,
                    "metadata.parent_timestamp",
                    format!(
                        "declared parent_timestamp {} does not match the parent's recorded timestamp {}",
                        format_timestamp(declared),
                        format_timestamp(parent)
                    ),
                )),
                Some(_) => {}
            }

            if metadata.timestamp <= parent {
                findings.push(Finding::blocking(
                    level,
                    "metadata.timestamp",
                    format!(
                        "timestamp {} is not after the parent's {} (stale derivation)",
                        format_timestamp(metadata.timestamp),
                        format_timestamp(parent)
                    ),
                ));
            }
        }

        if metadata.timestamp > now + self.skew_tolerance {
            findings.push(Finding::warning(
                level,
                "metadata.timestamp",
                format!(
                    "timestamp {} is ahead of wall time by more than {}s",
                    format_timestamp(metadata.timestamp),
                    self.skew_tolerance.num_seconds()
                ),
            ));
        }

        debug!(level = %level, findings = findings.len(), "timestamp ordering checked");
        findings
    }
}

impl Default for TimestampOrderer {
    fn default() -> Self {
        Self::new()
    }
}
