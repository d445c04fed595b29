use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetcfgError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] crate::reconcile::ReconcileError),
}

impl NetcfgError {
    /// True when the run never reached the store because the connection
    /// could not be established.
    pub fn is_store_unavailable(&self) -> bool {
        match self {
            NetcfgError::Store(e) => e.is_unavailable(),
            NetcfgError::Reconcile(e) => e.is_store_unavailable(),
            NetcfgError::Config(_) => false,
        }
    }
}

/// Errors raised while reading the desired document or the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Duplicate tenant name '{name}'")]
    DuplicateTenant { name: String },

    #[error("Duplicate network name '{network}' in tenant '{tenant}'")]
    DuplicateNetwork { tenant: String, network: String },

    #[error("Invalid {field} '{value}' for {entity}: {reason}")]
    InvalidField {
        entity: String,
        field: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, NetcfgError>;
