//! Key-value state store holding the authoritative tenant, network and
//! endpoint records.
//!
//! The store is flat per entity kind: every kind owns a key prefix and an
//! entity's identifier is the key suffix after that prefix. Hierarchy is
//! only implied by the records' contents.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::settings::{StoreBackend, StoreSettings};

pub mod error;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub const TENANT_PREFIX: &str = "/netcfg/config/global/";
pub const NETWORK_PREFIX: &str = "/netcfg/config/nets/";
pub const ENDPOINT_PREFIX: &str = "/netcfg/config/eps/";

/// The three levels of the configuration hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Tenant,
    Network,
    Endpoint,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Tenant,
        EntityKind::Network,
        EntityKind::Endpoint,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Tenant => TENANT_PREFIX,
            EntityKind::Network => NETWORK_PREFIX,
            EntityKind::Endpoint => ENDPOINT_PREFIX,
        }
    }

    pub fn key(self, id: &str) -> String {
        format!("{}{}", self.prefix(), id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Tenant => "tenant",
            EntityKind::Network => "network",
            EntityKind::Endpoint => "endpoint",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive operations of the remote key-value store.
///
/// Reading or deleting an absent key, and listing a prefix with no keys
/// under it, all fail with [`StoreError::NotFound`].
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Lists the full keys stored under `prefix`, in key order.
    async fn read_recursive(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    async fn write(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Opens the configured store backend.
pub fn open(settings: &StoreSettings) -> Result<Arc<dyn StateStore>, StoreError> {
    match settings.backend {
        StoreBackend::Sqlite => Ok(Arc::new(SqliteStore::open(&settings.path)?)),
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Opens the configured backend for inspection only. Nothing is created or
/// written; a SQLite store that does not exist yet is unavailable.
pub fn open_read_only(settings: &StoreSettings) -> Result<Arc<dyn StateStore>, StoreError> {
    match settings.backend {
        StoreBackend::Sqlite => Ok(Arc::new(SqliteStore::open_read_only(&settings.path)?)),
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
