//! Validate command

use std::path::PathBuf;

use clap::Args;

use netcfg::config::load_document;
use netcfg::NetcfgError;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Desired configuration document (JSON)
    pub document: PathBuf,
}

pub fn execute(args: ValidateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let document = load_document(&args.document).map_err(NetcfgError::from)?;

    let networks: usize = document.tenants.iter().map(|t| t.networks.len()).sum();
    let endpoints: usize = document
        .tenants
        .iter()
        .flat_map(|t| &t.networks)
        .map(|n| n.endpoints.len())
        .sum();

    println!(
        "{}: {} tenant(s), {} network(s), {} endpoint(s)",
        args.document.display(),
        document.tenants.len(),
        networks,
        endpoints
    );
    Ok(())
}
