//! Test harness for isolated reconciliation runs.
//!
//! `TestHarness` owns an in-memory store, the executor the reconciler talks
//! to, and a wait that records every settle call instead of sleeping.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use netcfg::config::schema::Document;
use netcfg::executor::{OperationExecutor, RecordingExecutor, StoreExecutor};
use netcfg::reconcile::snapshot::snapshot_ids;
use netcfg::reconcile::{PropagationWait, ReconcileError, Reconciler, RunOptions, RunReport};
use netcfg::store::{EntityKind, MemoryStore, StateStore};

/// Wait that counts settle calls and never sleeps.
#[derive(Default)]
pub struct CountingWait {
    settled: Mutex<Vec<(EntityKind, String)>>,
}

impl CountingWait {
    pub fn settled(&self) -> Vec<(EntityKind, String)> {
        self.settled.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.settled.lock().unwrap().len()
    }
}

#[async_trait]
impl PropagationWait for CountingWait {
    async fn settle(&self, kind: EntityKind, id: &str) {
        self.settled.lock().unwrap().push((kind, id.to_string()));
    }
}

/// Isolated reconciliation environment.
pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub wait: Arc<CountingWait>,
    /// Set when the harness was built with [`TestHarness::recording`].
    pub recorder: Option<Arc<RecordingExecutor>>,
    reconciler: Reconciler,
}

impl TestHarness {
    /// Reconciler writing real records into the in-memory store.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let executor = Arc::new(StoreExecutor::new(store.clone()));
        Self::build(store, executor, None)
    }

    /// Reconciler whose operations are only recorded by `executor`.
    pub fn recording(executor: RecordingExecutor) -> Self {
        let store = Arc::new(MemoryStore::new());
        let executor = Arc::new(executor);
        Self::build(store, executor.clone(), Some(executor))
    }

    fn build(
        store: Arc<MemoryStore>,
        executor: Arc<dyn OperationExecutor>,
        recorder: Option<Arc<RecordingExecutor>>,
    ) -> Self {
        let wait = Arc::new(CountingWait::default());
        let reconciler = Reconciler::new(store.clone(), executor, wait.clone());
        Self {
            store,
            wait,
            recorder,
            reconciler,
        }
    }

    /// Write a placeholder record for `kind`/`id` directly into the store.
    pub async fn seed(&self, kind: EntityKind, id: &str) {
        self.store.write(&kind.key(id), b"{}").await.unwrap();
    }

    pub async fn run(
        &self,
        document: &Document,
        options: RunOptions,
    ) -> Result<RunReport, ReconcileError> {
        self.reconciler.run(document, options).await
    }

    /// Identifiers currently stored for `kind`.
    pub async fn ids(&self, kind: EntityKind) -> BTreeSet<String> {
        snapshot_ids(self.store.as_ref(), kind).await.unwrap()
    }

    /// Requests seen by the recording executor, rendered as text.
    pub fn labels(&self) -> Vec<String> {
        self.recorder
            .as_ref()
            .map(|r| r.requests().iter().map(|req| req.to_string()).collect())
            .unwrap_or_default()
    }
}
