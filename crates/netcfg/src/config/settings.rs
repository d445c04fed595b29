//! Run settings: which store to talk to and how a run behaves.
//!
//! Resolved in layers: built-in defaults, then an optional JSON settings
//! file, then `NETCFG_*` environment variables. The CLI applies its flags
//! on top of the result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_STORE_PATH: &str = "NETCFG_STORE_PATH";
pub const ENV_PROPAGATION_WAIT_MS: &str = "NETCFG_PROPAGATION_WAIT_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub store: StoreSettings,
    /// Delete store entities missing from the document before applying it.
    #[serde(default)]
    pub prune_stale: bool,
    #[serde(default)]
    pub direction: Direction,
    /// Skip creating tenants and networks the store already holds.
    #[serde(default)]
    pub idempotent: bool,
    #[serde(default = "default_propagation_wait_ms")]
    pub propagation_wait_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Whether the document's entities are created or removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Apply,
    Remove,
}

fn default_propagation_wait_ms() -> u64 {
    1000
}

fn default_store_path() -> PathBuf {
    default_state_path().unwrap_or_else(|| PathBuf::from("netcfg-state.db"))
}

/// Returns the canonical store path: `~/.netcfg/state.db`.
pub fn default_state_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".netcfg").join("state.db"))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreSettings::default(),
            prune_stale: false,
            direction: Direction::Apply,
            idempotent: false,
            propagation_wait_ms: default_propagation_wait_ms(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            path: default_store_path(),
        }
    }
}

impl Settings {
    /// Loads settings from an optional file and applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(path) = std::env::var(ENV_STORE_PATH) {
            if !path.is_empty() {
                self.store.path = PathBuf::from(path);
            }
        }

        if let Ok(wait) = std::env::var(ENV_PROPAGATION_WAIT_MS) {
            self.propagation_wait_ms =
                wait.trim().parse().map_err(|_| ConfigError::Validation {
                    message: format!(
                        "{} must be a number of milliseconds, got '{}'",
                        ENV_PROPAGATION_WAIT_MS, wait
                    ),
                })?;
        }

        Ok(())
    }

    pub fn propagation_wait(&self) -> Duration {
        Duration::from_millis(self.propagation_wait_ms)
    }
}
