//! Chain and batch execution
//!
//! A chain is the ordered set of document files for one discovered
//! codebase: inventory, then optionally systems, containers and
//! components. Levels run strictly in order; the first blocking finding
//! fails the level and halts the chain below it. Within a renderable
//! level, changed entities are rendered in parallel and the checksum
//! ledger is updated by a single writer afterwards.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info, warn};

use archdoc_model::{Document, EntityRef, Finding, Level};
use archdoc_render::{RenderContext, TemplateRenderer};
use archdoc_validate::{
    validate_transition, DocumentState, KnownIds, ReferenceGraphChecker, SchemaValidator,
    TimestampOrderer, DEFAULT_SKEW_TOLERANCE_SECS,
};

use crate::canonical::entity_checksum;
use crate::change::{ChangeDetector, ChangeRecord, ChangeStore, ChangeStoreError};
use crate::io::read_source;
use crate::report::{ChainReport, LevelReport, RunReport};
use crate::store::{put_with_retry, DocumentStore, RetryPolicy, StoreError};

/// Document files for one discovered codebase, in level order
///
/// The inventory is mandatory; lower levels are processed only when
/// present. A missing intermediate level surfaces as dangling parent
/// references in the level below it.
#[derive(Debug, Clone)]
pub struct DocumentChain {
    pub inventory: PathBuf,
    pub systems: Option<PathBuf>,
    pub containers: Option<PathBuf>,
    pub components: Option<PathBuf>,
}

impl DocumentChain {
    /// Chain with only an inventory file
    #[inline]
    #[must_use]
    pub fn new(inventory: impl Into<PathBuf>) -> Self {
        Self {
            inventory: inventory.into(),
            systems: None,
            containers: None,
            components: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_systems(mut self, path: impl Into<PathBuf>) -> Self {
        self.systems = Some(path.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_containers(mut self, path: impl Into<PathBuf>) -> Self {
        self.containers = Some(path.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_components(mut self, path: impl Into<PathBuf>) -> Self {
        self.components = Some(path.into());
        self
    }

    fn levels(&self) -> Vec<(Level, &Path)> {
        let mut levels = vec![(Level::Inventory, self.inventory.as_path())];
        if let Some(path) = &self.systems {
            levels.push((Level::System, path.as_path()));
        }
        if let Some(path) = &self.containers {
            levels.push((Level::Container, path.as_path()));
        }
        if let Some(path) = &self.components {
            levels.push((Level::Component, path.as_path()));
        }
        levels
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path of the persisted checksum ledger
    pub change_store: PathBuf,
    /// Tolerance for timestamps ahead of wall time, in seconds
    pub skew_tolerance_secs: i64,
    /// Retry behavior for store writes
    pub retry: RetryPolicy,
}

impl PipelineConfig {
    /// Defaults with the given ledger path
    #[inline]
    #[must_use]
    pub fn new(change_store: impl Into<PathBuf>) -> Self {
        Self {
            change_store: change_store.into(),
            skew_tolerance_secs: DEFAULT_SKEW_TOLERANCE_SECS,
            retry: RetryPolicy::default(),
        }
    }
}

/// Errors that abort a run outright
///
/// Validation and rendering problems never surface here; they become
/// findings in the report. Only ledger persistence can fail the run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    ChangeStore(#[from] ChangeStoreError),
}

/// The full validate-detect-render pipeline over a [`DocumentStore`]
pub struct Pipeline<S> {
    store: S,
    config: PipelineConfig,
    validator: SchemaValidator,
    reference: ReferenceGraphChecker,
    renderer: TemplateRenderer,
}

struct RenderResult {
    entity_id: String,
    checksum: String,
    output_path: String,
    findings: Vec<Finding>,
    write: Result<(), StoreError>,
}

impl<S: DocumentStore> Pipeline<S> {
    #[must_use]
    pub fn new(store: S, config: PipelineConfig) -> Self {
        Self {
            store,
            config,
            validator: SchemaValidator::new(),
            reference: ReferenceGraphChecker::new(),
            renderer: TemplateRenderer::new(),
        }
    }

    /// Access to the underlying store
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process one chain
    ///
    /// # Errors
    /// Returns an error only when the checksum ledger cannot be loaded
    /// or saved.
    pub fn run_chain(&self, chain: &DocumentChain) -> Result<ChainReport, PipelineError> {
        let mut ledger = ChangeStore::load(&self.config.change_store)?;
        let report = self.process_chain(chain, &mut ledger);
        ledger.save()?;
        Ok(report)
    }

    /// Process several chains with chain isolation
    ///
    /// A halted chain never stops the others; the exit code aggregates
    /// findings across all of them.
    ///
    /// # Errors
    /// Returns an error only when the checksum ledger cannot be loaded
    /// or saved.
    pub fn run_batch(&self, chains: &[DocumentChain]) -> Result<RunReport, PipelineError> {
        let mut ledger = ChangeStore::load(&self.config.change_store)?;
        let mut run = RunReport::default();
        for chain in chains {
            run.chains.push(self.process_chain(chain, &mut ledger));
        }
        ledger.save()?;
        info!(
            chains = run.chains.len(),
            rendered = run.rendered(),
            exit_code = run.exit_code(),
            "batch complete"
        );
        Ok(run)
    }

    fn process_chain(&self, chain: &DocumentChain, ledger: &mut ChangeStore) -> ChainReport {
        let mut report = ChainReport::default();
        let mut known = KnownIds::new();
        let mut parent_timestamp: Option<DateTime<Utc>> = None;
        let orderer = TimestampOrderer::with_tolerance_secs(self.config.skew_tolerance_secs);

        for (level, path) in chain.levels() {
            let outcome =
                self.process_level(level, path, &mut known, parent_timestamp, &orderer, ledger);
            let halted = outcome.report.state == DocumentState::Failed;
            let timestamp = outcome.document_timestamp;
            report.levels.push(outcome.report);
            if halted {
                warn!(level = %level, "chain halted on blocking findings");
                report.halted_at = Some(level);
                break;
            }
            parent_timestamp = timestamp;
        }
        report
    }

    fn process_level(
        &self,
        level: Level,
        path: &Path,
        known: &mut KnownIds,
        parent_timestamp: Option<DateTime<Utc>>,
        orderer: &TimestampOrderer,
        ledger: &mut ChangeStore,
    ) -> LevelOutcome {
        let mut state = DocumentState::Unvalidated;
        let mut findings = Vec::new();

        let text = match read_source(path) {
            Ok(text) => text,
            Err(err) => {
                findings.push(Finding::blocking(level, "$", err.to_string()));
                return LevelOutcome::failed(level, findings);
            }
        };

        let raw: Value = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(err) => {
                findings.push(Finding::blocking(level, "$", format!("invalid JSON: {err}")));
                return LevelOutcome::failed(level, findings);
            }
        };

        let outcome = self.validator.validate(level, &raw);
        findings.extend(outcome.findings);
        let Some(document) = outcome.document else {
            return LevelOutcome::failed(level, findings);
        };
        state = advance(state);

        known.register(&document);
        let reference_findings = self.reference.check(&document, known);
        let blocked = reference_findings.iter().any(Finding::is_blocking);
        findings.extend(reference_findings);
        findings.extend(self.reference.check_coverage(&document, known));
        if blocked {
            return LevelOutcome::failed(level, findings);
        }
        state = advance(state);

        let timestamp_findings =
            orderer.check(level, document.metadata(), parent_timestamp, Utc::now());
        let blocked = timestamp_findings.iter().any(Finding::is_blocking);
        findings.extend(timestamp_findings);
        if blocked {
            return LevelOutcome::failed(level, findings);
        }
        state = advance(state);
        state = advance(state);
        debug!(level = %level, state = ?state, "document validated");

        let mut report = if level.is_renderable() {
            self.render_level(&document, ledger, &mut findings)
        } else {
            LevelReport::validation_only(level, state, Vec::new())
        };
        report.state = state;
        report.findings = findings;
        LevelOutcome {
            report,
            document_timestamp: Some(document.metadata().timestamp),
        }
    }

    fn render_level(
        &self,
        document: &Document,
        ledger: &mut ChangeStore,
        findings: &mut Vec<Finding>,
    ) -> LevelReport {
        let level = document.level();
        let now = Utc::now();

        let mut work: Vec<(EntityRef<'_>, String)> = Vec::new();
        let mut checksums: Vec<(String, String)> = Vec::new();
        for entity in document.entities() {
            match entity.to_value() {
                Ok(value) => {
                    let checksum = entity_checksum(&value);
                    checksums.push((entity.id().to_string(), checksum.clone()));
                    work.push((entity, checksum));
                }
                Err(err) => findings.push(
                    Finding::warning(
                        level,
                        level.array_field(),
                        format!("entity could not be serialized for hashing: {err}"),
                    )
                    .with_entity(entity.id().to_string()),
                ),
            }
        }

        let set = ChangeDetector::new().detect(ledger, level, &checksums);
        let to_render: Vec<&(EntityRef<'_>, String)> = work
            .iter()
            .filter(|(entity, _)| {
                set.new.iter().any(|id| id == entity.id())
                    || set.modified.iter().any(|id| id == entity.id())
            })
            .collect();

        let results: Vec<RenderResult> = to_render
            .par_iter()
            .map(|(entity, checksum)| self.render_one(*entity, checksum, now))
            .collect();

        let mut report = LevelReport::validation_only(level, DocumentState::Ready, Vec::new());
        report.new = set.new.len();
        report.modified = set.modified.len();
        report.unchanged = set.unchanged.len();
        report.stale = ledger
            .ids_at(level)
            .into_iter()
            .filter(|id| !checksums.iter().any(|(known, _)| known == id))
            .map(str::to_string)
            .collect();

        // Single writer: ledger updates happen here, never in the workers.
        for result in results {
            findings.extend(result.findings);
            match result.write {
                Ok(()) => {
                    ledger.upsert(
                        level,
                        result.entity_id,
                        ChangeRecord {
                            checksum: result.checksum,
                            last_updated: now,
                            generated_at: now,
                            output_path: result.output_path,
                        },
                    );
                    report.rendered += 1;
                }
                Err(err) => {
                    findings.push(
                        Finding::warning(
                            level,
                            level.array_field(),
                            format!("store write failed after retries, page skipped: {err}"),
                        )
                        .with_entity(result.entity_id.clone()),
                    );
                    report.skipped.push(result.entity_id);
                }
            }
        }
        info!(
            level = %level,
            rendered = report.rendered,
            unchanged = report.unchanged,
            skipped = report.skipped.len(),
            "level rendered"
        );
        report
    }

    fn render_one(&self, entity: EntityRef<'_>, checksum: &str, now: DateTime<Utc>) -> RenderResult {
        let output_path = format!("{}/{}.md", entity.level().code(), entity.id());
        let mut findings = Vec::new();

        let previous = match self.store.get(&output_path) {
            Ok(previous) => previous,
            Err(err) => {
                findings.push(
                    Finding::warning(
                        entity.level(),
                        entity.level().array_field(),
                        format!("previous page could not be fetched, manual sections may be lost: {err}"),
                    )
                    .with_entity(entity.id().to_string()),
                );
                None
            }
        };

        let ctx = RenderContext {
            generated_at: now,
            source_checksum: checksum.to_string(),
        };
        let outcome = self.renderer.render(entity, &ctx, previous.as_deref());
        findings.extend(outcome.findings);

        let write = put_with_retry(&self.store, self.config.retry, &output_path, &outcome.markdown);
        RenderResult {
            entity_id: entity.id().to_string(),
            checksum: checksum.to_string(),
            output_path,
            findings,
            write,
        }
    }
}

struct LevelOutcome {
    report: LevelReport,
    document_timestamp: Option<DateTime<Utc>>,
}

impl LevelOutcome {
    fn failed(level: Level, findings: Vec<Finding>) -> Self {
        Self {
            report: LevelReport::validation_only(level, DocumentState::Failed, findings),
            document_timestamp: None,
        }
    }
}

/// Move to the next validation state; transitions are checked so a
/// future reordering of the stages fails loudly instead of silently
fn advance(state: DocumentState) -> DocumentState {
    match state.next_on_pass() {
        Some(next) if validate_transition(state, next).is_ok() => next,
        _ => DocumentState::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_walks_the_happy_path() {
        let mut state = DocumentState::Unvalidated;
        for expected in [
            DocumentState::SchemaChecked,
            DocumentState::ReferenceChecked,
            DocumentState::TimestampChecked,
            DocumentState::Ready,
        ] {
            state = advance(state);
            assert_eq!(state, expected);
        }
        assert_eq!(advance(DocumentState::Ready), DocumentState::Failed);
    }

    #[test]
    fn chain_levels_are_ordered() {
        let chain = DocumentChain::new("inv.json")
            .with_containers("c2.json")
            .with_systems("c1.json");
        let levels: Vec<Level> = chain.levels().into_iter().map(|(l, _)| l).collect();
        assert_eq!(levels, vec![Level::Inventory, Level::System, Level::Container]);
    }
}
