//! Declarative topology model.
//!
//! These types mirror the YAML topology file one to one. Type tags (`type`
//! on nodes and interfaces) stay plain strings here; they are resolved into
//! closed enums by [`crate::topology::types`] when the topology is compiled.

use serde::{Deserialize, Serialize};

use crate::utils::validation::{
    validate_hardware_address, validate_interface_names, validate_unique_names,
};

/// Root of a topology file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topology {
    /// Commands prepended to every generated script
    pub precmd: Vec<HookGroup>,
    /// Commands run before any node or switch is created
    pub preinit: Vec<HookGroup>,
    /// Commands run once all links are wired
    pub postinit: Vec<HookGroup>,
    /// Commands run after teardown
    pub postfini: Vec<HookGroup>,
    pub nodes: Vec<Node>,
    pub switches: Vec<Switch>,
    pub node_configs: Vec<NodeConfig>,
    pub test: Vec<Test>,
}

impl Topology {
    /// Validate the load-time invariants of the topology.
    ///
    /// Duplicate or empty node/switch names and malformed hardware addresses
    /// are rejected. Over-long interface names are only logged, the kernel
    /// will refuse them when the script runs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_unique_names("node", self.nodes.iter().map(|n| n.name.as_str()))?;
        validate_unique_names("switch", self.switches.iter().map(|s| s.name.as_str()))?;

        for node in &self.nodes {
            for iface in &node.interfaces {
                if let Some(addr) = iface.addr.as_deref() {
                    validate_hardware_address(&node.name, &iface.name, addr)?;
                }
            }
        }

        validate_interface_names(self);

        Ok(())
    }

    /// Look up a node by name
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Look up a switch by name
    pub fn switch(&self, name: &str) -> Option<&Switch> {
        self.switches.iter().find(|switch| switch.name == name)
    }
}

/// A group of hook commands (`precmd`, `preinit`, `postinit`, `postfini`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookGroup {
    pub cmds: Vec<Cmd>,
}

/// A single shell command line as written in the topology file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cmd {
    pub cmd: String,
}

impl Cmd {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }
}

/// A unit of isolation: a docker container or a bare network namespace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub name: String,
    /// `docker`/`container` (default) or `netns`/`namespace`
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    /// Docker network the container starts on, `none` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub interfaces: Vec<Interface>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sysctls: Vec<Sysctl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<String>,
}

/// A kernel parameter assignment such as `net.ipv4.ip_forward=1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sysctl {
    #[serde(alias = "string")]
    pub sysctl: String,
}

impl Sysctl {
    pub fn new(sysctl: impl Into<String>) -> Self {
        Self { sysctl: sysctl.into() }
    }
}

/// A bridge device shared by several node interfaces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Switch {
    pub name: String,
    /// Attachment points, informational only. Wiring is driven from the
    /// node side.
    pub interfaces: Vec<Interface>,
}

/// A network attachment point on a node or switch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interface {
    pub name: String,
    /// `direct`, `bridge`, `veth` or `phys`
    #[serde(rename = "type")]
    pub kind: String,
    /// `peer#peerif` for direct links, the switch name for bridge links,
    /// the host-side peer name for veth links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    /// Hardware address override for the local end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,
}

/// Commands run inside the node of the same name once wiring is done
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub name: String,
    pub cmds: Vec<Cmd>,
}

/// A named group of validation commands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Test {
    pub name: String,
    pub cmds: Vec<Cmd>,
}

/// Topology validation errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },
    #[error("A {kind} has an empty name")]
    EmptyName { kind: &'static str },
    #[error("Invalid hardware address '{addr}' on {node}:{interface}")]
    InvalidHardwareAddress {
        node: String,
        interface: String,
        addr: String,
    },
}
