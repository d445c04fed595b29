//! Operation requests and the executors that apply them.
//!
//! The reconciler never touches the store for mutations. It builds one
//! [`OperationRequest`] per create or delete and hands it, by value, to an
//! [`OperationExecutor`].

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::schema::{endpoint_id, EndpointConfig, NetworkConfig, TenantConfig};
use crate::store::{EntityKind, StoreError};

pub mod recording;
pub mod store;

pub use recording::RecordingExecutor;
pub use store::{EndpointRecord, NetworkRecord, StoreExecutor, TenantRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => f.write_str("create"),
            Operation::Delete => f.write_str("delete"),
        }
    }
}

/// Kind-specific parameters carried by a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityParams {
    /// Only the identifier is known, e.g. for a stale entry found in the store.
    None,
    Tenant {
        net_type: String,
        subnet_pool: String,
        alloc_subnet_len: u32,
        vlans: String,
        vxlans: String,
    },
    Network {
        tenant: String,
        pkt_tag: Option<String>,
    },
    Endpoint {
        network: String,
        container: Option<String>,
        host: String,
        intf: Option<String>,
    },
}

/// A single create or delete, built fresh for every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationRequest {
    kind: EntityKind,
    operation: Operation,
    id: String,
    params: EntityParams,
}

impl OperationRequest {
    pub fn create_tenant(tenant: &TenantConfig) -> Self {
        Self {
            kind: EntityKind::Tenant,
            operation: Operation::Create,
            id: tenant.name.clone(),
            params: EntityParams::Tenant {
                net_type: tenant.default_net_type.clone(),
                subnet_pool: tenant.subnet_pool.clone(),
                alloc_subnet_len: tenant.alloc_subnet_len,
                vlans: tenant.vlans.clone(),
                vxlans: tenant.vxlans.clone(),
            },
        }
    }

    pub fn delete_tenant(tenant: &TenantConfig) -> Self {
        Self::delete_stale(EntityKind::Tenant, &tenant.name)
    }

    pub fn create_network(tenant: &TenantConfig, network: &NetworkConfig) -> Self {
        Self {
            kind: EntityKind::Network,
            operation: Operation::Create,
            id: network.name.clone(),
            params: EntityParams::Network {
                tenant: tenant.name.clone(),
                pkt_tag: network.pkt_tag().map(str::to_string),
            },
        }
    }

    pub fn delete_network(tenant: &TenantConfig, network: &NetworkConfig) -> Self {
        Self {
            kind: EntityKind::Network,
            operation: Operation::Delete,
            id: network.name.clone(),
            params: EntityParams::Network {
                tenant: tenant.name.clone(),
                pkt_tag: None,
            },
        }
    }

    pub fn create_endpoint(network: &NetworkConfig, endpoint: &EndpointConfig) -> Self {
        Self::endpoint(Operation::Create, network, endpoint)
    }

    pub fn delete_endpoint(network: &NetworkConfig, endpoint: &EndpointConfig) -> Self {
        Self::endpoint(Operation::Delete, network, endpoint)
    }

    /// A delete for an entity known only by its store identifier.
    pub fn delete_stale(kind: EntityKind, id: &str) -> Self {
        Self {
            kind,
            operation: Operation::Delete,
            id: id.to_string(),
            params: EntityParams::None,
        }
    }

    fn endpoint(operation: Operation, network: &NetworkConfig, endpoint: &EndpointConfig) -> Self {
        Self {
            kind: EntityKind::Endpoint,
            operation,
            id: endpoint_id(network, endpoint),
            params: EntityParams::Endpoint {
                network: network.name.clone(),
                container: endpoint.container().map(str::to_string),
                host: endpoint.host.clone(),
                intf: endpoint.intf().map(str::to_string),
            },
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> &EntityParams {
        &self.params
    }
}

impl fmt::Display for OperationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", self.operation, self.kind, self.id)
    }
}

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("{kind} '{id}' rejected: {reason}")]
    Rejected {
        kind: EntityKind,
        id: String,
        reason: String,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to encode {kind} record: {source}")]
    Encode {
        kind: EntityKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Applies one request at a time. Implementations must complete the
/// operation before returning.
#[async_trait]
pub trait OperationExecutor: Send + Sync {
    async fn execute(&self, request: OperationRequest) -> Result<(), ExecutorError>;
}
