//! Builder patterns for creating desired documents programmatically.
//!
//! These builders allow creating nested tenant/network/endpoint trees
//! without repeating every optional field.

#![allow(dead_code)]

use netcfg::config::schema::{Document, EndpointConfig, NetworkConfig, TenantConfig};

/// Builder for creating `Document` instances.
#[derive(Default)]
pub struct DocumentBuilder {
    tenants: Vec<TenantConfig>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tenant built with `TenantBuilder`.
    pub fn tenant(mut self, tenant: TenantBuilder) -> Self {
        self.tenants.push(tenant.build());
        self
    }

    pub fn build(self) -> Document {
        Document {
            tenants: self.tenants,
        }
    }
}

/// Builder for creating `TenantConfig` instances.
pub struct TenantBuilder {
    tenant: TenantConfig,
}

impl TenantBuilder {
    /// Create a vlan tenant with a /16 pool carved into /24 subnets.
    pub fn new(name: &str) -> Self {
        Self {
            tenant: TenantConfig {
                name: name.to_string(),
                default_net_type: "vlan".to_string(),
                subnet_pool: "11.1.0.0/16".to_string(),
                alloc_subnet_len: 24,
                vlans: "11-48".to_string(),
                vxlans: String::new(),
                networks: vec![],
            },
        }
    }

    pub fn vxlans(mut self, vxlans: &str) -> Self {
        self.tenant.vxlans = vxlans.to_string();
        self
    }

    pub fn network(mut self, network: NetworkBuilder) -> Self {
        self.tenant.networks.push(network.build());
        self
    }

    pub fn build(self) -> TenantConfig {
        self.tenant
    }
}

/// Builder for creating `NetworkConfig` instances.
pub struct NetworkBuilder {
    network: NetworkConfig,
}

impl NetworkBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            network: NetworkConfig {
                name: name.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn pkt_tag(mut self, tag: &str) -> Self {
        self.network.pkt_tag = tag.to_string();
        self
    }

    /// Attach a container endpoint.
    pub fn container(mut self, container: &str, host: &str) -> Self {
        self.network.endpoints.push(EndpointConfig {
            container: container.to_string(),
            host: host.to_string(),
            intf: String::new(),
        });
        self
    }

    /// Attach the host itself through `intf`.
    pub fn host_native(mut self, host: &str, intf: &str) -> Self {
        self.network.endpoints.push(EndpointConfig {
            container: String::new(),
            host: host.to_string(),
            intf: intf.to_string(),
        });
        self
    }

    pub fn build(self) -> NetworkConfig {
        self.network
    }
}
