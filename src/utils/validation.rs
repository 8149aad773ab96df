//! Topology validation utilities.
//!
//! Load-time checks for the invariants the compiler assumes: unique names,
//! well-formed hardware addresses and interface names the kernel accepts.

use crate::config::{Topology, ValidationError};
use crate::topology::links::bridge_peer_name;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Longest interface name Linux accepts (`IFNAMSIZ` minus the NUL byte)
pub const MAX_IFNAME_LEN: usize = 15;

static MAC_PATTERN: LazyLock<Regex> = LazyLock::new(||
    Regex::new(r"^[0-9A-Fa-f]{2}(:[0-9A-Fa-f]{2}){5}$").unwrap()
);

/// Validate that every name is non-empty and appears only once
///
/// # Arguments
/// * `kind` - Entity kind used in the error message ("node", "switch")
/// * `names` - Names in declaration order
///
/// # Examples
/// ```
/// use tinet::utils::validation::validate_unique_names;
///
/// assert!(validate_unique_names("node", ["R1", "R2"].into_iter()).is_ok());
/// assert!(validate_unique_names("node", ["R1", "R1"].into_iter()).is_err());
/// ```
pub fn validate_unique_names<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(ValidationError::EmptyName { kind });
        }
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Validate a hardware address override (`aa:bb:cc:dd:ee:ff`)
pub fn validate_hardware_address(
    node: &str,
    interface: &str,
    addr: &str,
) -> Result<(), ValidationError> {
    if MAC_PATTERN.is_match(addr) {
        Ok(())
    } else {
        Err(ValidationError::InvalidHardwareAddress {
            node: node.to_string(),
            interface: interface.to_string(),
            addr: addr.to_string(),
        })
    }
}

/// Warn about interface names longer than the kernel allows.
///
/// Covers declared interface names as well as the host-side names
/// synthesized for bridge links. Returns the offending names.
pub fn validate_interface_names(topology: &Topology) -> Vec<String> {
    let mut too_long = Vec::new();

    for node in &topology.nodes {
        for iface in &node.interfaces {
            if iface.name.len() > MAX_IFNAME_LEN {
                too_long.push(iface.name.clone());
            }
            if iface.kind == "bridge" {
                if let Some(switch) = iface.args.as_deref() {
                    let peer = bridge_peer_name(switch, &node.name);
                    if peer.len() > MAX_IFNAME_LEN {
                        too_long.push(peer);
                    }
                }
            }
        }
    }

    for switch in &topology.switches {
        if switch.name.len() > MAX_IFNAME_LEN {
            too_long.push(switch.name.clone());
        }
    }

    for name in &too_long {
        log::warn!(
            "Interface name '{}' is longer than {} bytes and will be rejected by the kernel",
            name, MAX_IFNAME_LEN
        );
    }

    too_long
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Interface, Node, Switch};

    #[test]
    fn test_unique_names() {
        assert!(validate_unique_names("switch", ["B0", "B1"].into_iter()).is_ok());
        assert_eq!(
            validate_unique_names("switch", ["B0", "B1", "B0"].into_iter()),
            Err(ValidationError::DuplicateName {
                kind: "switch",
                name: "B0".to_string()
            })
        );
        assert_eq!(
            validate_unique_names("node", ["R1", ""].into_iter()),
            Err(ValidationError::EmptyName { kind: "node" })
        );
    }

    #[test]
    fn test_hardware_address() {
        assert!(validate_hardware_address("R1", "net0", "52:54:00:ab:CD:ef").is_ok());
        assert!(validate_hardware_address("R1", "net0", "52:54:00:ab:cd").is_err());
        assert!(validate_hardware_address("R1", "net0", "52-54-00-ab-cd-ef").is_err());
        assert!(validate_hardware_address("R1", "net0", "").is_err());
    }

    #[test]
    fn test_interface_name_length() {
        let topology = Topology {
            nodes: vec![Node {
                name: "router-with-long-name".to_string(),
                interfaces: vec![
                    Interface {
                        name: "net0".to_string(),
                        kind: "bridge".to_string(),
                        args: Some("B0".to_string()),
                        addr: None,
                    },
                    Interface {
                        name: "averyverylongname0".to_string(),
                        kind: "phys".to_string(),
                        args: None,
                        addr: None,
                    },
                ],
                ..Default::default()
            }],
            switches: vec![Switch {
                name: "B0".to_string(),
                interfaces: Vec::new(),
            }],
            ..Default::default()
        };

        let too_long = validate_interface_names(&topology);
        assert_eq!(
            too_long,
            vec!["B0-router-with-long-name".to_string(), "averyverylongname0".to_string()]
        );
    }
}
