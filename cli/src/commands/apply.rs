//! Apply command: reconcile the store against a desired document.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::info;

use netcfg::config::{load_document, Direction, Settings, StoreBackend};
use netcfg::executor::RecordingExecutor;
use netcfg::reconcile::{NoWait, Reconciler, RunOptions};
use netcfg::NetcfgError;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Desired configuration document (JSON)
    pub document: PathBuf,

    /// Settings file (JSON); flags below override it
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// SQLite store path
    #[arg(long, conflicts_with = "memory")]
    pub store: Option<PathBuf>,

    /// Use a throwaway in-memory store
    #[arg(long)]
    pub memory: bool,

    /// Delete stored entities the document does not declare before applying
    #[arg(long)]
    pub desired: bool,

    /// Remove the document's entities instead of creating them
    #[arg(long)]
    pub remove: bool,

    /// Skip creating tenants and networks the store already holds
    #[arg(long)]
    pub idempotent: bool,

    /// Propagation wait after each mutation, in milliseconds
    #[arg(long)]
    pub wait_ms: Option<u64>,

    /// Plan the run without mutating the store
    #[arg(long)]
    pub dry_run: bool,
}

impl ApplyArgs {
    /// Layers the command-line flags over `settings`.
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(path) = &self.store {
            settings.store.backend = StoreBackend::Sqlite;
            settings.store.path = path.clone();
        }
        if self.memory {
            settings.store.backend = StoreBackend::Memory;
        }
        if self.desired {
            settings.prune_stale = true;
        }
        if self.remove {
            settings.direction = Direction::Remove;
        }
        if self.idempotent {
            settings.idempotent = true;
        }
        if let Some(ms) = self.wait_ms {
            settings.propagation_wait_ms = ms;
        }
    }
}

pub async fn execute(args: ApplyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::load(args.settings.as_deref()).map_err(NetcfgError::from)?;
    args.apply_to(&mut settings);

    let document = load_document(&args.document).map_err(NetcfgError::from)?;
    let options = RunOptions::from_settings(&settings);

    let reconciler = if args.dry_run {
        info!("Dry run: operations are recorded, not executed");
        let store = netcfg::store::open_read_only(&settings.store).map_err(NetcfgError::from)?;
        Reconciler::new(store, Arc::new(RecordingExecutor::new()), Arc::new(NoWait))
    } else {
        Reconciler::from_settings(&settings).map_err(NetcfgError::from)?
    };

    info!(
        document = %args.document.display(),
        store = %settings.store.path.display(),
        direction = ?settings.direction,
        "Starting reconciliation"
    );
    let report = reconciler
        .run(&document, options)
        .await
        .map_err(NetcfgError::from)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
