//! Validation stages for discovery documents
//!
//! Three ordered stages, each producing [`Finding`]s:
//!
//! 1. [`SchemaValidator`]: structural conformance over raw JSON; the
//!    typed [`Document`](archdoc_model::Document) is only materialized
//!    when nothing blocking was found
//! 2. [`ReferenceGraphChecker`]: parent references, relation targets and
//!    repository names against the chain-wide [`KnownIds`] registry
//! 3. [`TimestampOrderer`]: strict generation-time ordering against the
//!    parent document and wall-clock skew
//!
//! [`DocumentState`] tracks each document's progress through the stages;
//! a blocking finding moves it to `Failed` and stops the chain below it.
//!
//! [`Finding`]: archdoc_model::Finding

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod reference;
mod schema;
mod state;
mod timestamp;

pub use reference::{KnownIds, ReferenceGraphChecker};
pub use schema::{SchemaValidator, ValidationOutcome};
pub use state::{allowed_transitions, validate_transition, DocumentState, StateMachineError};
pub use timestamp::{TimestampOrderer, DEFAULT_SKEW_TOLERANCE_SECS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
