//! Run reports
//!
//! One [`LevelReport`] per processed document, one [`ChainReport`] per
//! chain, one [`RunReport`] per batch. The process exit code is computed
//! across the whole run: `0` clean, `1` warnings, `2` blocking.

use archdoc_model::{exit_code, Finding, Level};
use archdoc_validate::DocumentState;

/// Outcome of one document level
#[derive(Debug)]
pub struct LevelReport {
    pub level: Level,
    /// Final validation state
    pub state: DocumentState,
    pub findings: Vec<Finding>,
    /// Entities rendered for the first time
    pub new: usize,
    /// Entities re-rendered because their checksum changed
    pub modified: usize,
    /// Entities skipped as unchanged
    pub unchanged: usize,
    /// Pages actually written this run
    pub rendered: usize,
    /// Entity ids whose store writes failed after retries
    pub skipped: Vec<String>,
    /// Ledger entries with no matching entity in the current document;
    /// reported, never deleted automatically
    pub stale: Vec<String>,
}

impl LevelReport {
    pub(crate) fn validation_only(
        level: Level,
        state: DocumentState,
        findings: Vec<Finding>,
    ) -> Self {
        Self {
            level,
            state,
            findings,
            new: 0,
            modified: 0,
            unchanged: 0,
            rendered: 0,
            skipped: Vec::new(),
            stale: Vec::new(),
        }
    }
}

/// Outcome of one document chain
#[derive(Debug, Default)]
pub struct ChainReport {
    pub levels: Vec<LevelReport>,
    /// Level at which a blocking finding stopped the chain, if any
    pub halted_at: Option<Level>,
}

impl ChainReport {
    /// All findings across the chain's levels
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.levels.iter().flat_map(|l| l.findings.iter())
    }

    /// Whether the chain stopped on a blocking finding
    #[inline]
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted_at.is_some()
    }
}

/// Outcome of one batch run
#[derive(Debug, Default)]
pub struct RunReport {
    pub chains: Vec<ChainReport>,
}

impl RunReport {
    /// Process exit code across every chain
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        exit_code(self.chains.iter().flat_map(ChainReport::findings))
    }

    /// Total pages written
    #[must_use]
    pub fn rendered(&self) -> usize {
        self.chains
            .iter()
            .flat_map(|c| c.levels.iter())
            .map(|l| l.rendered)
            .sum()
    }
}
