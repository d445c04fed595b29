//! netcfg CLI
//!
//! Command-line front end for reconciling a network configuration document
//! against the state store.

use clap::{Parser, Subcommand};

use netcfg::{NetcfgError, ReconcileError, StoreError};

mod commands;
mod logging;

use logging::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "netcfg")]
#[command(about = "netcfg - Declarative tenant/network/endpoint reconciliation", long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconcile the store against a desired document
    Apply(commands::apply::ApplyArgs),
    /// Parse and validate a document without touching the store
    Validate(commands::validate::ValidateArgs),
    /// List the identifiers held in the store, per kind
    Show(commands::show::ShowArgs),
}

const EXIT_FAILURE: i32 = 1;
const EXIT_STORE_UNAVAILABLE: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_format) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    let result = match cli.command {
        Commands::Apply(args) => commands::apply::execute(args).await,
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Show(args) => commands::show::execute(args).await,
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(e.as_ref()));
    }
}

fn exit_code(err: &(dyn std::error::Error + 'static)) -> i32 {
    let unavailable = if let Some(e) = err.downcast_ref::<NetcfgError>() {
        e.is_store_unavailable()
    } else if let Some(e) = err.downcast_ref::<StoreError>() {
        e.is_unavailable()
    } else if let Some(e) = err.downcast_ref::<ReconcileError>() {
        e.is_store_unavailable()
    } else {
        false
    };

    if unavailable {
        EXIT_STORE_UNAVAILABLE
    } else {
        EXIT_FAILURE
    }
}
