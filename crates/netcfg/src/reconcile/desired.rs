use std::collections::HashSet;

use crate::config::schema::{endpoint_id, Document};
use crate::store::EntityKind;

/// Identifier sets of everything the document declares, per kind.
///
/// Network names are collected across all tenants, matching the flat
/// per-kind namespace of the store.
#[derive(Debug, Default)]
pub struct DesiredIndex {
    tenants: HashSet<String>,
    networks: HashSet<String>,
    endpoints: HashSet<String>,
}

impl DesiredIndex {
    pub fn from_document(document: &Document) -> Self {
        let mut index = Self::default();
        for tenant in &document.tenants {
            index.tenants.insert(tenant.name.clone());
            for network in &tenant.networks {
                index.networks.insert(network.name.clone());
                for endpoint in &network.endpoints {
                    index.endpoints.insert(endpoint_id(network, endpoint));
                }
            }
        }
        index
    }

    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::Tenant => self.tenants.contains(id),
            EntityKind::Network => self.networks.contains(id),
            EntityKind::Endpoint => self.endpoints.contains(id),
        }
    }
}
