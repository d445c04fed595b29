use serde::Serialize;

use crate::executor::{Operation, OperationRequest};
use crate::store::EntityKind;

/// One operation as it appears in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationSummary {
    pub operation: Operation,
    pub kind: EntityKind,
    pub id: String,
}

impl From<&OperationRequest> for OperationSummary {
    fn from(request: &OperationRequest) -> Self {
        Self {
            operation: request.operation(),
            kind: request.kind(),
            id: request.id().to_string(),
        }
    }
}

/// An entity identified by kind and store identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: &str) -> Self {
        Self {
            kind,
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneFailure {
    pub kind: EntityKind,
    pub id: String,
    pub error: String,
}

/// Outcome of a reconciliation run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Stale entities removed by the prune pass.
    pub pruned: Vec<EntityRef>,
    /// Stale entities the prune pass failed to remove.
    pub prune_failures: Vec<PruneFailure>,
    /// Tenants and networks left alone because the store already had them.
    pub skipped: Vec<EntityRef>,
    /// Successful operations of the additive or destructive pass, in order.
    pub operations: Vec<OperationSummary>,
}

impl RunReport {
    pub fn created(&self) -> usize {
        self.count(Operation::Create)
    }

    pub fn deleted(&self) -> usize {
        self.count(Operation::Delete)
    }

    fn count(&self, operation: Operation) -> usize {
        self.operations
            .iter()
            .filter(|op| op.operation == operation)
            .count()
    }
}
