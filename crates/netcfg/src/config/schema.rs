use serde::{Deserialize, Serialize};

/// Suffix used for endpoints that attach the host itself rather than a container.
pub const NATIVE_INTF_SUFFIX: &str = "native-intf";

/// The desired configuration document: tenants, their networks, and the
/// endpoints attached to each network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Document {
    #[serde(default)]
    pub tenants: Vec<TenantConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TenantConfig {
    pub name: String,
    #[serde(default)]
    pub default_net_type: String,
    #[serde(default)]
    pub subnet_pool: String,
    #[serde(default)]
    pub alloc_subnet_len: u32,
    #[serde(default)]
    pub vlans: String,
    #[serde(default)]
    pub vxlans: String,
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkConfig {
    pub name: String,
    /// Packet tag fixed outside the allocator (e.g. assigned by a fabric
    /// controller). Empty means the tag is allocated downstream.
    #[serde(default)]
    pub pkt_tag: String,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointConfig {
    #[serde(default)]
    pub container: String,
    pub host: String,
    #[serde(default)]
    pub intf: String,
}

impl TenantConfig {
    pub fn has_networks(&self) -> bool {
        !self.networks.is_empty()
    }
}

impl NetworkConfig {
    pub fn pkt_tag(&self) -> Option<&str> {
        non_empty(&self.pkt_tag)
    }

    pub fn has_endpoints(&self) -> bool {
        !self.endpoints.is_empty()
    }
}

impl EndpointConfig {
    pub fn container(&self) -> Option<&str> {
        non_empty(&self.container)
    }

    pub fn intf(&self) -> Option<&str> {
        non_empty(&self.intf)
    }
}

/// Derives the store identifier of an endpoint.
///
/// `<network>-<container>` for container endpoints, `<host>-native-intf`
/// otherwise. Host-native identifiers ignore the network, so two networks
/// attaching the same host produce the same identifier.
pub fn endpoint_id(network: &NetworkConfig, endpoint: &EndpointConfig) -> String {
    match endpoint.container() {
        Some(container) => format!("{}-{}", network.name, container),
        None => format!("{}-{}", endpoint.host, NATIVE_INTF_SUFFIX),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
