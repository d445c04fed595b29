//! State store error types.

use thiserror::Error;

/// Errors from state store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The key, or every key under a prefix, is absent.
    #[error("Key not found: {0}")]
    NotFound(String),

    /// The store could not be opened or reached.
    #[error("Store unavailable at '{location}': {reason}")]
    Unavailable { location: String, reason: String },

    /// SQLite error from rusqlite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A migration failed to apply.
    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    /// The store lock was poisoned.
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}
