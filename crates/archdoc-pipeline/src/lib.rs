//! Incremental validation and generation pipeline
//!
//! Orchestrates the full flow over a chain of discovery documents:
//!
//! 1. read and parse each level's JSON file
//! 2. run the validation stages from `archdoc-validate`
//! 3. checksum entities in canonical form and diff against the ledger
//! 4. render new and modified entities in parallel via `archdoc-render`
//! 5. write pages through a [`DocumentStore`] with retry on connection
//!    failures, then update the ledger from a single writer
//!
//! The run never mutates source files; its only writes are rendered
//! pages and the checksum ledger.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod canonical;
mod change;
mod io;
mod report;
mod runner;
mod store;

pub use canonical::{canonical_json, entity_checksum};
pub use change::{ChangeDetector, ChangeRecord, ChangeSet, ChangeStore, ChangeStoreError};
pub use io::{read_source, ReadError};
pub use report::{ChainReport, LevelReport, RunReport};
pub use runner::{DocumentChain, Pipeline, PipelineConfig, PipelineError};
pub use store::{
    put_with_retry, DocumentStore, FsDocumentStore, MemoryStore, RetryPolicy, StoreError,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
