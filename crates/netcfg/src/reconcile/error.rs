use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::executor::{ExecutorError, Operation};
use crate::store::{EntityKind, StoreError};

/// The pass a run was in when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Prune,
    Additive,
    Destructive,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Prune => f.write_str("prune"),
            Stage::Additive => f.write_str("additive"),
            Stage::Destructive => f.write_str("destructive"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("State store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("Failed to list stored {kind} entries: {source}")]
    Snapshot {
        kind: EntityKind,
        #[source]
        source: StoreError,
    },

    #[error("Failed to check whether {kind} '{id}' exists: {source}")]
    ExistenceCheck {
        kind: EntityKind,
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("{stage} pass stopped at step {step}: {operation} {kind} '{id}' failed: {source}")]
    OperationFailed {
        stage: Stage,
        step: usize,
        operation: Operation,
        kind: EntityKind,
        id: String,
        #[source]
        source: ExecutorError,
    },
}

impl ReconcileError {
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, ReconcileError::StoreUnavailable(_))
    }

    /// Reclassifies a store failure seen mid-run, keeping connection loss
    /// distinct from ordinary read errors.
    pub(crate) fn snapshot(kind: EntityKind, source: StoreError) -> Self {
        if source.is_unavailable() {
            ReconcileError::StoreUnavailable(source)
        } else {
            ReconcileError::Snapshot { kind, source }
        }
    }

    pub(crate) fn existence_check(kind: EntityKind, id: &str, source: StoreError) -> Self {
        if source.is_unavailable() {
            ReconcileError::StoreUnavailable(source)
        } else {
            ReconcileError::ExistenceCheck {
                kind,
                id: id.to_string(),
                source,
            }
        }
    }
}
