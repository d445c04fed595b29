use std::collections::BTreeSet;

use serde::Deserialize;

use crate::store::{EntityKind, StateStore, StoreError};

/// The part of a stored network record naming its tenant.
#[derive(Deserialize)]
struct NetworkOwner {
    #[serde(default)]
    tenant: Option<String>,
}

/// Lists the identifiers stored for `kind`.
///
/// An empty or missing prefix yields an empty set; every other store error
/// is returned unchanged.
pub async fn snapshot_ids(
    store: &dyn StateStore,
    kind: EntityKind,
) -> Result<BTreeSet<String>, StoreError> {
    let prefix = kind.prefix();
    let keys = match store.read_recursive(prefix).await {
        Ok(keys) => keys,
        Err(e) if e.is_not_found() => return Ok(BTreeSet::new()),
        Err(e) => return Err(e),
    };

    Ok(keys
        .iter()
        .filter_map(|key| key.strip_prefix(prefix))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect())
}

/// Whether the store holds a record for `kind`/`id`.
pub async fn exists(store: &dyn StateStore, kind: EntityKind, id: &str) -> Result<bool, StoreError> {
    match store.read(&kind.key(id)).await {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Whether network `id` is stored under `tenant`.
///
/// False when the network is absent or its record names another tenant. A
/// record whose owner cannot be read counts as in place.
pub async fn network_owned_by(
    store: &dyn StateStore,
    id: &str,
    tenant: &str,
) -> Result<bool, StoreError> {
    let value = match store.read(&EntityKind::Network.key(id)).await {
        Ok(value) => value,
        Err(e) if e.is_not_found() => return Ok(false),
        Err(e) => return Err(e),
    };

    match serde_json::from_slice::<NetworkOwner>(&value) {
        Ok(NetworkOwner {
            tenant: Some(owner),
        }) if owner != tenant => {
            tracing::debug!(
                network = %id,
                %owner,
                %tenant,
                "Stored network belongs to another tenant"
            );
            Ok(false)
        }
        _ => Ok(true),
    }
}
