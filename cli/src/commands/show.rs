//! Show command: list what the store currently holds.

use std::path::PathBuf;

use clap::Args;
use serde_json::{Map, Value};

use netcfg::config::{Settings, StoreBackend};
use netcfg::reconcile::snapshot::snapshot_ids;
use netcfg::store::EntityKind;
use netcfg::NetcfgError;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Settings file (JSON)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// SQLite store path
    #[arg(long)]
    pub store: Option<PathBuf>,
}

pub async fn execute(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::load(args.settings.as_deref()).map_err(NetcfgError::from)?;
    if let Some(path) = args.store {
        settings.store.backend = StoreBackend::Sqlite;
        settings.store.path = path;
    }

    let store = netcfg::store::open(&settings.store).map_err(NetcfgError::from)?;

    let mut listing = Map::new();
    for kind in EntityKind::ALL {
        let ids = snapshot_ids(store.as_ref(), kind)
            .await
            .map_err(NetcfgError::from)?;
        listing.insert(
            kind.as_str().to_string(),
            Value::Array(ids.into_iter().map(Value::String).collect()),
        );
    }

    println!("{}", serde_json::to_string_pretty(&Value::Object(listing))?);
    Ok(())
}
