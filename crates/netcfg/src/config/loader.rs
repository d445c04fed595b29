use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::path::Path;

use crate::config::schema::{Document, NetworkConfig, TenantConfig};
use crate::error::ConfigError;

const MAX_VLAN_ID: u32 = 4095;
const MAX_PKT_TAG: u32 = 16_777_215;

pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_document_from_str(&content)
}

pub fn load_document_from_str(content: &str) -> Result<Document, ConfigError> {
    let document: Document = serde_json::from_str(content)?;

    validate_document(&document)?;

    Ok(document)
}

/// Checks naming invariants and the syntax of every tenant and network field.
///
/// Derived endpoint identifiers are deliberately not checked for uniqueness.
pub fn validate_document(document: &Document) -> Result<(), ConfigError> {
    let mut tenant_names = HashSet::new();
    for tenant in &document.tenants {
        if tenant.name.is_empty() {
            return Err(ConfigError::Validation {
                message: "Tenant name must not be empty".to_string(),
            });
        }
        if !tenant_names.insert(tenant.name.as_str()) {
            return Err(ConfigError::DuplicateTenant {
                name: tenant.name.clone(),
            });
        }

        validate_tenant(tenant)?;
    }

    Ok(())
}

fn validate_tenant(tenant: &TenantConfig) -> Result<(), ConfigError> {
    let entity = format!("tenant '{}'", tenant.name);

    if !tenant.subnet_pool.is_empty() {
        let prefix_len = parse_cidr(&tenant.subnet_pool).map_err(|reason| {
            ConfigError::InvalidField {
                entity: entity.clone(),
                field: "SubnetPool",
                value: tenant.subnet_pool.clone(),
                reason,
            }
        })?;

        if tenant.alloc_subnet_len != 0
            && (tenant.alloc_subnet_len < prefix_len || tenant.alloc_subnet_len > 32)
        {
            return Err(ConfigError::InvalidField {
                entity,
                field: "AllocSubnetLen",
                value: tenant.alloc_subnet_len.to_string(),
                reason: format!("must be between {} and 32", prefix_len),
            });
        }
    } else if tenant.alloc_subnet_len > 32 {
        return Err(ConfigError::InvalidField {
            entity,
            field: "AllocSubnetLen",
            value: tenant.alloc_subnet_len.to_string(),
            reason: "must not exceed 32".to_string(),
        });
    }

    if !tenant.vlans.is_empty() {
        parse_range_list(&tenant.vlans, MAX_VLAN_ID).map_err(|reason| {
            ConfigError::InvalidField {
                entity: format!("tenant '{}'", tenant.name),
                field: "Vlans",
                value: tenant.vlans.clone(),
                reason,
            }
        })?;
    }

    if !tenant.vxlans.is_empty() {
        parse_range_list(&tenant.vxlans, MAX_PKT_TAG).map_err(|reason| {
            ConfigError::InvalidField {
                entity: format!("tenant '{}'", tenant.name),
                field: "Vxlans",
                value: tenant.vxlans.clone(),
                reason,
            }
        })?;
    }

    let mut network_names = HashSet::new();
    for network in &tenant.networks {
        if network.name.is_empty() {
            return Err(ConfigError::Validation {
                message: format!("Network name must not be empty in tenant '{}'", tenant.name),
            });
        }
        if !network_names.insert(network.name.as_str()) {
            return Err(ConfigError::DuplicateNetwork {
                tenant: tenant.name.clone(),
                network: network.name.clone(),
            });
        }

        validate_network(network)?;
    }

    Ok(())
}

fn validate_network(network: &NetworkConfig) -> Result<(), ConfigError> {
    if let Some(tag) = network.pkt_tag() {
        let valid = parse_decimal(tag)
            .map(|t| (1..=MAX_PKT_TAG).contains(&t))
            .unwrap_or(false);
        if !valid {
            return Err(ConfigError::InvalidField {
                entity: format!("network '{}'", network.name),
                field: "PktTag",
                value: tag.to_string(),
                reason: format!("must be an integer between 1 and {}", MAX_PKT_TAG),
            });
        }
    }

    for endpoint in &network.endpoints {
        if endpoint.host.is_empty() {
            return Err(ConfigError::Validation {
                message: format!("Endpoint in network '{}' has no host", network.name),
            });
        }
    }

    Ok(())
}

/// Parses `a.b.c.d/len` and returns the prefix length.
fn parse_cidr(value: &str) -> Result<u32, String> {
    let (addr, len) = value
        .split_once('/')
        .ok_or_else(|| "expected <address>/<prefix-length>".to_string())?;

    addr.parse::<Ipv4Addr>()
        .map_err(|e| format!("invalid address: {}", e))?;

    let len = parse_decimal(len).ok_or_else(|| format!("invalid prefix length '{}'", len))?;
    if len > 32 {
        return Err(format!("prefix length {} exceeds 32", len));
    }

    Ok(len)
}

/// Parses a range list such as `1-10,15,20-22` into inclusive pairs.
pub fn parse_range_list(value: &str, max: u32) -> Result<Vec<(u32, u32)>, String> {
    value
        .split(',')
        .map(|item| {
            let item = item.trim();
            let (start, end) = match item.split_once('-') {
                Some((s, e)) => (parse_id(s, max)?, parse_id(e, max)?),
                None => {
                    let id = parse_id(item, max)?;
                    (id, id)
                }
            };
            if start > end {
                return Err(format!("range '{}' is reversed", item));
            }
            Ok((start, end))
        })
        .collect()
}

fn parse_id(value: &str, max: u32) -> Result<u32, String> {
    let value = value.trim();
    let id = parse_decimal(value).ok_or_else(|| format!("'{}' is not a number", value))?;
    if id == 0 || id > max {
        return Err(format!("{} is outside 1..={}", id, max));
    }
    Ok(id)
}

/// Plain decimal digits only; signs and whitespace are rejected.
fn parse_decimal(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
