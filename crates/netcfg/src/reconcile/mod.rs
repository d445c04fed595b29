//! Reconciliation engine: converges the state store onto a desired document.
//!
//! A run is strictly sequential. Every store read and every executor call
//! completes before the next begins, and each successful mutation is
//! followed by the configured [`PropagationWait`].
//!
//! Passes:
//! - prune (optional): delete stored entities the document no longer
//!   declares, endpoints first, then networks, then tenants. Best-effort.
//! - additive: create tenants, networks, endpoints root-to-leaf. Fail-fast.
//! - destructive: delete the document's endpoints, then networks and
//!   tenants the document declares empty. Fail-fast.

use std::sync::Arc;

use tracing::Instrument;

use crate::config::schema::Document;
use crate::config::settings::{Direction, Settings};
use crate::executor::{OperationExecutor, OperationRequest, StoreExecutor};
use crate::store::{EntityKind, StateStore, StoreError};

mod additive;
mod destructive;
mod prune;

pub mod desired;
pub mod error;
pub mod report;
pub mod snapshot;
pub mod wait;

pub use desired::DesiredIndex;
pub use error::{ReconcileError, Stage};
pub use report::{EntityRef, OperationSummary, PruneFailure, RunReport};
pub use wait::{FixedDelay, NoWait, PropagationWait};

/// What a run does, independent of where it does it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub prune_stale: bool,
    pub direction: Direction,
    pub idempotent: bool,
}

impl RunOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            prune_stale: settings.prune_stale,
            direction: settings.direction,
            idempotent: settings.idempotent,
        }
    }
}

pub struct Reconciler {
    store: Arc<dyn StateStore>,
    executor: Arc<dyn OperationExecutor>,
    wait: Arc<dyn PropagationWait>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn StateStore>,
        executor: Arc<dyn OperationExecutor>,
        wait: Arc<dyn PropagationWait>,
    ) -> Self {
        Self {
            store,
            executor,
            wait,
        }
    }

    /// Opens the configured store and pairs it with an executor writing to
    /// that same store and the configured propagation wait.
    pub fn from_settings(settings: &Settings) -> Result<Self, StoreError> {
        let store = crate::store::open(&settings.store)?;
        let executor = Arc::new(StoreExecutor::new(store.clone()));
        let wait = Arc::new(FixedDelay::new(settings.propagation_wait()));
        Ok(Self::new(store, executor, wait))
    }

    /// Runs the passes selected by `options` against `document`.
    pub async fn run(
        &self,
        document: &Document,
        options: RunOptions,
    ) -> Result<RunReport, ReconcileError> {
        let mut report = RunReport::default();

        if options.prune_stale {
            self.prune_stale(document, &mut report)
                .instrument(tracing::info_span!("reconcile.prune"))
                .await?;
        }

        match options.direction {
            Direction::Apply => {
                self.apply(document, options.idempotent, &mut report)
                    .instrument(tracing::info_span!(
                        "reconcile.additive",
                        idempotent = options.idempotent
                    ))
                    .await?
            }
            Direction::Remove => {
                self.remove(document, &mut report)
                    .instrument(tracing::info_span!("reconcile.destructive"))
                    .await?
            }
        }

        tracing::info!(
            pruned = report.pruned.len(),
            prune_failures = report.prune_failures.len(),
            created = report.created(),
            deleted = report.deleted(),
            skipped = report.skipped.len(),
            "Reconciliation finished"
        );

        Ok(report)
    }

    /// Hands `request` to the executor as step `step.next()` of a fail-fast
    /// pass, then waits for propagation.
    async fn execute_step(
        &self,
        steps: &mut StepCounter,
        request: OperationRequest,
        report: &mut RunReport,
    ) -> Result<(), ReconcileError> {
        let step = steps.next();
        let summary = OperationSummary::from(&request);

        if let Err(source) = self.executor.execute(request).await {
            tracing::error!(
                stage = %steps.stage,
                step,
                kind = %summary.kind,
                id = %summary.id,
                "{} failed: {}",
                summary.operation,
                source
            );
            return Err(ReconcileError::OperationFailed {
                stage: steps.stage,
                step,
                operation: summary.operation,
                kind: summary.kind,
                id: summary.id,
                source,
            });
        }

        self.wait.settle(summary.kind, &summary.id).await;
        report.operations.push(summary);
        Ok(())
    }

    async fn exists(&self, kind: EntityKind, id: &str) -> Result<bool, ReconcileError> {
        snapshot::exists(self.store.as_ref(), kind, id)
            .await
            .map_err(|e| ReconcileError::existence_check(kind, id, e))
    }

    async fn network_in_place(&self, tenant: &str, network: &str) -> Result<bool, ReconcileError> {
        snapshot::network_owned_by(self.store.as_ref(), network, tenant)
            .await
            .map_err(|e| ReconcileError::existence_check(EntityKind::Network, network, e))
    }
}

/// 1-based numbering of the operations issued by one pass.
struct StepCounter {
    stage: Stage,
    issued: usize,
}

impl StepCounter {
    fn new(stage: Stage) -> Self {
        Self { stage, issued: 0 }
    }

    fn next(&mut self) -> usize {
        self.issued += 1;
        self.issued
    }
}
