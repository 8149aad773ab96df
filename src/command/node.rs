//! Node commands.
//!
//! Creation, removal and in-node execution for both node kinds, plus the
//! image pull and status listing commands.

use super::netns::{netns_delete, netns_link_up, netns_list, remove_netns_handle};
use super::Command;
use crate::compiler::CompileError;
use crate::config::Node;
use crate::topology::NodeKind;
use crate::utils::unique_in_order;

/// Docker network used when a node does not set `net_base`
pub const DEFAULT_NET_BASE: &str = "none";

/// Create a node.
///
/// Containers are started with a single `docker run` carrying one
/// `--sysctl` per sysctl and one `-v` per mount, the image last. Namespaces
/// are added, get their sysctls applied inside the namespace and have
/// loopback brought up.
pub fn create_node(node: &Node, kind: NodeKind) -> Result<Vec<Command>, CompileError> {
    match kind {
        NodeKind::Container => {
            let image = node
                .image
                .as_deref()
                .filter(|image| !image.is_empty())
                .ok_or_else(|| CompileError::MissingImage {
                    node: node.name.clone(),
                })?;
            let net_base = node
                .net_base
                .as_deref()
                .filter(|net| !net.is_empty())
                .unwrap_or(DEFAULT_NET_BASE);

            #[rustfmt::skip]
            let mut run = Command::new("docker").args([
                "run", "-td",
                "--hostname", node.name.as_str(),
                "--net", net_base,
                "--name", node.name.as_str(),
                "--rm", "--privileged",
            ]);
            for sysctl in &node.sysctls {
                run = run.args(["--sysctl", sysctl.sysctl.as_str()]);
            }
            for mount in &node.mounts {
                run = run.args(["-v", mount.as_str()]);
            }

            Ok(vec![run.arg(image)])
        }
        NodeKind::Namespace => {
            let name = node.name.as_str();
            let mut cmds = vec![Command::new("ip").args(["netns", "add", name])];
            for sysctl in &node.sysctls {
                cmds.push(Command::new("ip").args([
                    "netns",
                    "exec",
                    name,
                    "sysctl",
                    "-w",
                    sysctl.sysctl.as_str(),
                ]));
            }
            cmds.push(netns_link_up(name, "lo"));
            Ok(cmds)
        }
    }
}

/// Remove a node and its namespace handle.
///
/// Always exactly two commands, independent of the node's interfaces.
pub fn delete_node(name: &str, kind: NodeKind) -> Vec<Command> {
    let remove = match kind {
        NodeKind::Container => Command::new("docker").args(["rm", "-f", name]),
        NodeKind::Namespace => netns_delete(name),
    };
    vec![remove, remove_netns_handle(name)]
}

/// The argv that runs a command inside a node
pub fn exec_prefix(name: &str, kind: NodeKind) -> Vec<String> {
    let prefix = match kind {
        NodeKind::Container => vec!["docker", "exec", name],
        NodeKind::Namespace => vec!["ip", "netns", "exec", name],
    };
    prefix.into_iter().map(String::from).collect()
}

/// Run user-written shell text inside a node
pub fn exec_in_node(name: &str, kind: NodeKind, cmd: &str) -> Command {
    Command::Prefixed {
        prefix: exec_prefix(name, kind),
        cmd: cmd.to_string(),
    }
}

/// One `docker pull` per distinct image, in first-seen order.
///
/// Nodes without an image (namespaces) are skipped.
pub fn pull_images(nodes: &[Node]) -> Vec<Command> {
    let images = nodes
        .iter()
        .filter_map(|node| node.image.as_deref())
        .filter(|image| !image.is_empty());

    unique_in_order(images)
        .into_iter()
        .map(|image| Command::new("docker").args(["pull", image]))
        .collect()
}

/// List running (or all) containers, then the named namespaces
pub fn list_nodes(all: bool) -> Vec<Command> {
    let mut ps = Command::new("docker").args([
        "ps",
        "--format",
        r"table {{.ID}}\t{{.Names}}\t{{.Status}}\t{{.Networks}}",
    ]);
    if all {
        ps = ps.arg("-a");
    }
    vec![ps, netns_list()]
}
