//! Executor that materializes requests as JSON records in the state store.
//!
//! Creates are upserts. Parents must exist before a child is created, and a
//! parent that still has children recorded under it is not deleted.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{EntityParams, ExecutorError, Operation, OperationExecutor, OperationRequest};
use crate::store::{EntityKind, StateStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRecord {
    pub name: String,
    pub default_net_type: String,
    pub subnet_pool: String,
    pub alloc_subnet_len: u32,
    pub vlans: String,
    pub vxlans: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    pub name: String,
    pub tenant: String,
    pub pkt_tag: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRecord {
    pub id: String,
    pub network: String,
    pub container: Option<String>,
    pub host: String,
    pub intf: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct StoreExecutor {
    store: Arc<dyn StateStore>,
}

impl StoreExecutor {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    async fn create(&self, request: OperationRequest) -> Result<(), ExecutorError> {
        let kind = request.kind();
        let id = request.id().to_string();
        let created_at = Utc::now();

        let value = match request.params {
            EntityParams::Tenant {
                net_type,
                subnet_pool,
                alloc_subnet_len,
                vlans,
                vxlans,
            } => encode(
                kind,
                &TenantRecord {
                    name: id.clone(),
                    default_net_type: net_type,
                    subnet_pool,
                    alloc_subnet_len,
                    vlans,
                    vxlans,
                    created_at,
                },
            )?,
            EntityParams::Network { tenant, pkt_tag } => {
                self.require_parent(kind, &id, EntityKind::Tenant, &tenant)
                    .await?;
                encode(
                    kind,
                    &NetworkRecord {
                        name: id.clone(),
                        tenant,
                        pkt_tag,
                        created_at,
                    },
                )?
            }
            EntityParams::Endpoint {
                network,
                container,
                host,
                intf,
            } => {
                self.require_parent(kind, &id, EntityKind::Network, &network)
                    .await?;
                encode(
                    kind,
                    &EndpointRecord {
                        id: id.clone(),
                        network,
                        container,
                        host,
                        intf,
                        created_at,
                    },
                )?
            }
            EntityParams::None => {
                return Err(ExecutorError::Rejected {
                    kind,
                    id,
                    reason: "create requires entity parameters".to_string(),
                })
            }
        };

        self.store.write(&kind.key(&id), &value).await?;
        log::debug!("Stored {} record '{}'", kind, id);
        Ok(())
    }

    async fn delete(&self, request: OperationRequest) -> Result<(), ExecutorError> {
        let kind = request.kind();
        let id = request.id();

        match kind {
            EntityKind::Tenant => {
                let networks: Vec<NetworkRecord> = self.records(EntityKind::Network).await?;
                if let Some(child) = networks.iter().find(|n| n.tenant == id) {
                    return Err(ExecutorError::Rejected {
                        kind,
                        id: id.to_string(),
                        reason: format!("network '{}' still belongs to it", child.name),
                    });
                }
            }
            EntityKind::Network => {
                let endpoints: Vec<EndpointRecord> = self.records(EntityKind::Endpoint).await?;
                if let Some(child) = endpoints.iter().find(|e| e.network == id) {
                    return Err(ExecutorError::Rejected {
                        kind,
                        id: id.to_string(),
                        reason: format!("endpoint '{}' is still attached", child.id),
                    });
                }
            }
            EntityKind::Endpoint => {}
        }

        match self.store.delete(&kind.key(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Err(ExecutorError::Rejected {
                kind,
                id: id.to_string(),
                reason: "does not exist".to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn require_parent(
        &self,
        kind: EntityKind,
        id: &str,
        parent_kind: EntityKind,
        parent: &str,
    ) -> Result<(), ExecutorError> {
        match self.store.read(&parent_kind.key(parent)).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Err(ExecutorError::Rejected {
                kind,
                id: id.to_string(),
                reason: format!("{} '{}' does not exist", parent_kind, parent),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Decodes every record of `kind`. Entries that fail to decode are
    /// skipped; they cannot be anyone's parent.
    async fn records<T: DeserializeOwned>(&self, kind: EntityKind) -> Result<Vec<T>, ExecutorError> {
        let keys = match self.store.read_recursive(kind.prefix()).await {
            Ok(keys) => keys,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let value = match self.store.read(&key).await {
                Ok(value) => value,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e.into()),
            };
            match serde_json::from_slice(&value) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Ignoring undecodable {} record at {}: {}", kind, key, e),
            }
        }
        Ok(records)
    }
}

fn encode<T: Serialize>(kind: EntityKind, record: &T) -> Result<Vec<u8>, ExecutorError> {
    serde_json::to_vec(record).map_err(|source| ExecutorError::Encode { kind, source })
}

#[async_trait]
impl OperationExecutor for StoreExecutor {
    async fn execute(&self, request: OperationRequest) -> Result<(), ExecutorError> {
        match request.operation() {
            Operation::Create => self.create(request).await,
            Operation::Delete => self.delete(request).await,
        }
    }
}
