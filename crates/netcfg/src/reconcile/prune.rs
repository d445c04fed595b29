use tracing::{debug, info, warn};

use super::desired::DesiredIndex;
use super::report::{EntityRef, PruneFailure, RunReport};
use super::snapshot::snapshot_ids;
use super::{ReconcileError, Reconciler};
use crate::config::schema::Document;
use crate::executor::OperationRequest;
use crate::store::EntityKind;

/// Children before parents, each kind fully before the next.
const PRUNE_ORDER: [EntityKind; 3] = [
    EntityKind::Endpoint,
    EntityKind::Network,
    EntityKind::Tenant,
];

impl Reconciler {
    /// Deletes every stored entity that `document` does not declare.
    ///
    /// A failed delete is logged and recorded in the report, and the pass
    /// moves on. Only a failure to list a kind's entries stops the pass.
    pub async fn prune_stale(
        &self,
        document: &Document,
        report: &mut RunReport,
    ) -> Result<(), ReconcileError> {
        let desired = DesiredIndex::from_document(document);

        for kind in PRUNE_ORDER {
            let stored = snapshot_ids(self.store.as_ref(), kind)
                .await
                .map_err(|e| ReconcileError::snapshot(kind, e))?;
            debug!(%kind, stored = stored.len(), "Snapshot taken");

            for id in stored.iter().filter(|id| !desired.contains(kind, id)) {
                info!(%kind, %id, "Deleting stale entry");

                match self
                    .executor
                    .execute(OperationRequest::delete_stale(kind, id))
                    .await
                {
                    Ok(()) => {
                        self.wait.settle(kind, id).await;
                        report.pruned.push(EntityRef::new(kind, id));
                    }
                    Err(e) => {
                        warn!(%kind, %id, "Failed to delete stale entry: {}", e);
                        report.prune_failures.push(PruneFailure {
                            kind,
                            id: id.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
