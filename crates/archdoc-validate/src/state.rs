//! Per-document validation state machine
//!
//! `Unvalidated → SchemaChecked → ReferenceChecked → TimestampChecked →
//! Ready`, with `Failed` terminal on any blocking finding. Warnings never
//! change state.

use serde::{Deserialize, Serialize};

/// Validation progress of one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentState {
    Unvalidated,
    SchemaChecked,
    ReferenceChecked,
    TimestampChecked,
    Ready,
    Failed,
}

impl DocumentState {
    /// The state reached when the current stage passes
    #[inline]
    #[must_use]
    pub const fn next_on_pass(self) -> Option<DocumentState> {
        match self {
            DocumentState::Unvalidated => Some(DocumentState::SchemaChecked),
            DocumentState::SchemaChecked => Some(DocumentState::ReferenceChecked),
            DocumentState::ReferenceChecked => Some(DocumentState::TimestampChecked),
            DocumentState::TimestampChecked => Some(DocumentState::Ready),
            DocumentState::Ready | DocumentState::Failed => None,
        }
    }

    /// Whether this is a terminal state
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, DocumentState::Ready | DocumentState::Failed)
    }
}

/// States reachable from `from` in one transition
#[must_use]
pub fn allowed_transitions(from: DocumentState) -> Vec<DocumentState> {
    use DocumentState::*;
    match from {
        Unvalidated => vec![SchemaChecked, Failed],
        SchemaChecked => vec![ReferenceChecked, Failed],
        ReferenceChecked => vec![TimestampChecked, Failed],
        TimestampChecked => vec![Ready, Failed],
        Ready => vec![],
        Failed => vec![],
    }
}

/// Validates a state transition.
pub fn validate_transition(
    from: DocumentState,
    to: DocumentState,
) -> Result<(), StateMachineError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(StateMachineError::IllegalTransition { from, to })
    }
}

fn allowed(from: DocumentState, to: DocumentState) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}

/// State machine violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateMachineError {
    /// Transition not in the allowed set
    #[error("illegal state transition: {from:?} -> {to:?}")]
    IllegalTransition {
        from: DocumentState,
        to: DocumentState,
    },
}
