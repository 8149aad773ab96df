//! Lifecycle compiler.
//!
//! Walks a [`Topology`] and produces the ordered commands of every phase:
//! image pull, hooks, switch and node creation, namespace mounting, link
//! wiring, node configuration, tests and teardown. It also assembles those
//! phases into the scripts behind each subcommand.
//!
//! ## Ordering
//!
//! Within a phase, commands follow declaration order. Across phases a script
//! always creates switches before nodes, nodes (and their namespace handles)
//! before links, and links before configuration.
//!
//! ## Errors
//!
//! Every phase that can fail works unit by unit (a node, an interface, a node
//! config). With [`UnitPolicy::Abort`] the first failing unit aborts the whole
//! phase. With [`UnitPolicy::Skip`] the unit is left out, recorded in the
//! [`Diagnostics`], and compilation goes on. No placeholder command is ever
//! emitted for a failed unit. A node that can't be created is left out of
//! every later phase too, along with direct links from other nodes into it.
//!
//! The compiler performs no I/O and does not log.

pub mod diagnostics;
pub mod error;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::CompileError;

use crate::command::netns::{mount_container_netns, netns_link_address};
use crate::command::node::{create_node, delete_node, exec_in_node, pull_images};
use crate::command::switch::{create_switch, delete_switch};
use crate::command::Command;
use crate::config::{HookGroup, Node, Topology};
use crate::script::{Phase, Script};
use crate::topology::{bridge_peer_name, resolve_link, HandlePolicy, Link, NodeKind};
use std::collections::HashSet;

/// What to do with a unit that fails to compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitPolicy {
    /// Return the first error
    #[default]
    Abort,
    /// Leave the unit out and record it as a diagnostic
    Skip,
}

/// Compiler settings
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub on_error: UnitPolicy,
    pub handle_policy: HandlePolicy,
}

/// Compiles one topology
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'a> {
    topology: &'a Topology,
    options: CompileOptions,
}

/// Endpoint of a direct link: (node, interface)
type Endpoint = (String, String);

impl<'a> Compiler<'a> {
    pub fn new(topology: &'a Topology) -> Self {
        Self::with_options(topology, CompileOptions::default())
    }

    pub fn with_options(topology: &'a Topology, options: CompileOptions) -> Self {
        Self { topology, options }
    }

    pub fn topology(&self) -> &'a Topology {
        self.topology
    }

    // ------------------------------------------------------------------
    // Phases
    // ------------------------------------------------------------------

    /// `docker pull` for each distinct image
    pub fn pull(&self) -> Vec<Command> {
        pull_images(&self.topology.nodes)
    }

    pub fn precmd(&self) -> Vec<Command> {
        hook_commands(&self.topology.precmd)
    }

    pub fn preinit(&self) -> Vec<Command> {
        hook_commands(&self.topology.preinit)
    }

    pub fn postinit(&self) -> Vec<Command> {
        hook_commands(&self.topology.postinit)
    }

    pub fn postfini(&self) -> Vec<Command> {
        hook_commands(&self.topology.postfini)
    }

    /// Add and bring up every bridge
    pub fn create_switches(&self) -> Vec<Command> {
        self.topology
            .switches
            .iter()
            .flat_map(|switch| create_switch(&switch.name))
            .collect()
    }

    /// Create every node
    pub fn create_nodes(&self, diags: &mut Diagnostics) -> Result<Vec<Command>, CompileError> {
        let mut cmds = Vec::new();
        for node in &self.topology.nodes {
            let unit = NodeKind::of(node).and_then(|kind| create_node(node, kind));
            self.collect(&mut cmds, diags, unit)?;
        }
        Ok(cmds)
    }

    /// Kind of a node that `create_nodes` can create.
    ///
    /// A node whose creation fails carries the same error into every later
    /// phase, so nothing is mounted, wired or configured for it.
    fn creatable(&self, node: &Node) -> Result<NodeKind, CompileError> {
        let kind = NodeKind::of(node)?;
        create_node(node, kind)?;
        Ok(kind)
    }

    /// Expose each container's namespace under `/var/run/netns`
    pub fn mount_netns(&self, diags: &mut Diagnostics) -> Result<Vec<Command>, CompileError> {
        let mut cmds = Vec::new();
        for node in &self.topology.nodes {
            let unit = self.creatable(node).map(|kind| match kind {
                NodeKind::Container => mount_container_netns(&node.name),
                NodeKind::Namespace => Vec::new(),
            });
            self.collect(&mut cmds, diags, unit)?;
        }
        Ok(cmds)
    }

    /// Wire every interface of every node.
    ///
    /// A direct link declared from both ends is created once, by the first
    /// declaration; the second only contributes its address override.
    pub fn wire_links(&self, diags: &mut Diagnostics) -> Result<Vec<Command>, CompileError> {
        let mut cmds = Vec::new();
        let mut wired: HashSet<(Endpoint, Endpoint)> = HashSet::new();
        let mut bridge_peers: HashSet<String> = HashSet::new();

        for node in &self.topology.nodes {
            let kind = match self.creatable(node) {
                Ok(kind) => kind,
                Err(err) => {
                    self.collect(&mut cmds, diags, Err(err))?;
                    continue;
                }
            };

            for iface in &node.interfaces {
                let unit = match Link::parse(&node.name, iface) {
                    Ok(link) => self.wire_interface(
                        node,
                        kind,
                        &iface.name,
                        iface.addr.as_deref(),
                        &link,
                        &mut wired,
                        &mut bridge_peers,
                        diags,
                    ),
                    Err(err) => Err(err),
                };
                self.collect(&mut cmds, diags, unit)?;
            }
        }
        Ok(cmds)
    }

    #[allow(clippy::too_many_arguments)]
    fn wire_interface(
        &self,
        node: &Node,
        kind: NodeKind,
        interface: &str,
        addr: Option<&str>,
        link: &Link,
        wired: &mut HashSet<(Endpoint, Endpoint)>,
        bridge_peers: &mut HashSet<String>,
        diags: &mut Diagnostics,
    ) -> Result<Vec<Command>, CompileError> {
        match link {
            Link::Direct {
                peer_node,
                peer_interface,
            } => {
                let key = direct_key(&node.name, interface, peer_node, peer_interface);
                if wired.contains(&key) {
                    diags.warn(format!(
                        "Direct link {}:{} <-> {}:{} is declared twice, wiring it once",
                        node.name, interface, peer_node, peer_interface
                    ));
                    return Ok(addr
                        .map(|addr| vec![netns_link_address(&node.name, interface, addr)])
                        .unwrap_or_default());
                }
                match self.topology.node(peer_node) {
                    Some(peer) => {
                        if self.creatable(peer).is_err() {
                            return Err(CompileError::UncreatablePeer {
                                node: node.name.clone(),
                                interface: interface.to_string(),
                                peer: peer_node.clone(),
                            });
                        }
                    }
                    None => diags.warn(format!(
                        "Interface {}:{} links to undeclared node '{}'",
                        node.name, interface, peer_node
                    )),
                }
                wired.insert(key);
            }
            Link::Bridge { switch } => {
                if !bridge_peers.insert(bridge_peer_name(switch, &node.name)) {
                    return Err(CompileError::DuplicateBridgePeer {
                        node: node.name.clone(),
                        switch: switch.clone(),
                    });
                }
                if self.topology.switch(switch).is_none() {
                    diags.warn(format!(
                        "Interface {}:{} attaches to undeclared switch '{}'",
                        node.name, interface, switch
                    ));
                }
            }
            Link::Veth { .. } | Link::Phys => {
                let releases = kind == NodeKind::Container
                    && self.options.handle_policy == HandlePolicy::Release;
                if let Some(addr) = addr.filter(|_| releases) {
                    diags.warn(format!(
                        "Address {} on {}:{} is dropped, the netns handle is released \
                         before it can be set",
                        addr, node.name, interface
                    ));
                }
            }
        }

        Ok(resolve_link(&node.name, kind, interface, link, addr, self.options.handle_policy))
    }

    /// Run each node config's commands inside its node.
    ///
    /// Configs whose name matches no node emit nothing and raise a warning.
    pub fn configure(&self, diags: &mut Diagnostics) -> Result<Vec<Command>, CompileError> {
        let mut cmds = Vec::new();
        for config in &self.topology.node_configs {
            let Some(node) = self.topology.node(&config.name) else {
                diags.warn(format!("Node config '{}' matches no node", config.name));
                continue;
            };
            let unit = self.creatable(node).map(|kind| {
                config
                    .cmds
                    .iter()
                    .map(|cmd| exec_in_node(&node.name, kind, &cmd.cmd))
                    .collect()
            });
            self.collect(&mut cmds, diags, unit)?;
        }
        Ok(cmds)
    }

    /// Commands of all tests, or of the test called `name`
    pub fn tests(&self, name: Option<&str>) -> Result<Vec<Command>, CompileError> {
        if let Some(name) = name {
            if !self.topology.test.iter().any(|test| test.name == name) {
                return Err(CompileError::UnresolvableReference {
                    kind: "test",
                    name: name.to_string(),
                });
            }
        }

        Ok(self
            .topology
            .test
            .iter()
            .filter(|test| name.map_or(true, |name| test.name == name))
            .flat_map(|test| test.cmds.iter().map(|cmd| Command::shell(&cmd.cmd)))
            .collect())
    }

    /// Remove every node and bridge
    pub fn delete(&self, diags: &mut Diagnostics) -> Result<Vec<Command>, CompileError> {
        let mut cmds = Vec::new();
        for node in &self.topology.nodes {
            let unit = NodeKind::of(node).map(|kind| delete_node(&node.name, kind));
            self.collect(&mut cmds, diags, unit)?;
        }
        cmds.extend(self.topology.switches.iter().map(|switch| delete_switch(&switch.name)));
        Ok(cmds)
    }

    /// Run `args` inside the node called `node`
    pub fn exec(&self, node: &str, args: &[String]) -> Result<Command, CompileError> {
        let target = self
            .topology
            .node(node)
            .ok_or_else(|| CompileError::UnresolvableReference {
                kind: "node",
                name: node.to_string(),
            })?;
        let kind = NodeKind::of(target)?;
        Ok(exec_in_node(&target.name, kind, &args.join(" ")))
    }

    // ------------------------------------------------------------------
    // Scripts
    // ------------------------------------------------------------------

    /// precmd, preinit, switches, nodes, namespace handles, links, postinit
    pub fn up(&self) -> Result<Script, CompileError> {
        let mut script = Script::default();
        script.push(Phase::PreCmd, self.precmd());
        self.push_up(&mut script)?;
        Ok(script)
    }

    /// precmd, teardown, postfini
    pub fn down(&self) -> Result<Script, CompileError> {
        let mut script = Script::default();
        script.push(Phase::PreCmd, self.precmd());
        self.push_down(&mut script)?;
        Ok(script)
    }

    /// precmd, node configs
    pub fn conf(&self) -> Result<Script, CompileError> {
        let mut script = Script::default();
        script.push(Phase::PreCmd, self.precmd());
        self.push_conf(&mut script)?;
        Ok(script)
    }

    /// Teardown followed by a fresh `up`
    pub fn reup(&self) -> Result<Script, CompileError> {
        let mut script = self.down()?;
        self.push_up(&mut script)?;
        Ok(script)
    }

    /// Teardown, `up`, then node configs
    pub fn reconf(&self) -> Result<Script, CompileError> {
        let mut script = self.reup()?;
        self.push_conf(&mut script)?;
        Ok(script)
    }

    /// precmd, then the selected tests
    pub fn test_script(&self, name: Option<&str>) -> Result<Script, CompileError> {
        let mut script = Script::default();
        script.push(Phase::PreCmd, self.precmd());
        script.push(Phase::Test, self.tests(name)?);
        Ok(script)
    }

    pub fn pull_script(&self) -> Script {
        let mut script = Script::default();
        script.push(Phase::Pull, self.pull());
        script
    }

    pub fn exec_script(&self, node: &str, args: &[String]) -> Result<Script, CompileError> {
        let mut script = Script::default();
        script.push(Phase::Exec, vec![self.exec(node, args)?]);
        Ok(script)
    }

    fn push_up(&self, script: &mut Script) -> Result<(), CompileError> {
        script.push(Phase::PreInit, self.preinit());
        script.push(Phase::CreateSwitches, self.create_switches());
        let cmds = self.create_nodes(&mut script.diagnostics)?;
        script.push(Phase::CreateNodes, cmds);
        let cmds = self.mount_netns(&mut script.diagnostics)?;
        script.push(Phase::MountNetns, cmds);
        let cmds = self.wire_links(&mut script.diagnostics)?;
        script.push(Phase::WireLinks, cmds);
        script.push(Phase::PostInit, self.postinit());
        Ok(())
    }

    fn push_down(&self, script: &mut Script) -> Result<(), CompileError> {
        let cmds = self.delete(&mut script.diagnostics)?;
        script.push(Phase::Delete, cmds);
        script.push(Phase::PostFini, self.postfini());
        Ok(())
    }

    fn push_conf(&self, script: &mut Script) -> Result<(), CompileError> {
        let cmds = self.configure(&mut script.diagnostics)?;
        script.push(Phase::Configure, cmds);
        Ok(())
    }

    /// Append a unit's commands, or apply the unit policy to its error
    fn collect(
        &self,
        cmds: &mut Vec<Command>,
        diags: &mut Diagnostics,
        unit: Result<Vec<Command>, CompileError>,
    ) -> Result<(), CompileError> {
        match unit {
            Ok(unit_cmds) => {
                cmds.extend(unit_cmds);
                Ok(())
            }
            Err(err) => match self.options.on_error {
                UnitPolicy::Abort => Err(err),
                UnitPolicy::Skip => {
                    diags.skipped(&err);
                    Ok(())
                }
            },
        }
    }
}

fn hook_commands(groups: &[HookGroup]) -> Vec<Command> {
    groups
        .iter()
        .flat_map(|group| group.cmds.iter().map(|cmd| Command::shell(&cmd.cmd)))
        .collect()
}

/// Order-independent identity of a direct link
fn direct_key(
    node: &str,
    interface: &str,
    peer_node: &str,
    peer_interface: &str,
) -> (Endpoint, Endpoint) {
    let local = (node.to_string(), interface.to_string());
    let remote = (peer_node.to_string(), peer_interface.to_string());
    if local <= remote {
        (local, remote)
    } else {
        (remote, local)
    }
}
