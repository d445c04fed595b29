pub mod config;
pub mod error;
pub mod executor;
pub mod reconcile;
pub mod store;

pub use config::{load_document, load_document_from_str, Direction, Document, Settings};
pub use error::{ConfigError, NetcfgError, Result};
pub use executor::{
    ExecutorError, Operation, OperationExecutor, OperationRequest, RecordingExecutor, StoreExecutor,
};
pub use reconcile::{
    FixedDelay, NoWait, PropagationWait, ReconcileError, Reconciler, RunOptions, RunReport, Stage,
};
pub use store::{EntityKind, MemoryStore, SqliteStore, StateStore, StoreError};
