//! Link resolution.
//!
//! Turns one node interface into the commands that create and activate its
//! wiring. Each function returns its commands in execution order; callers
//! must not reorder them.

use super::types::{Link, NodeKind};
use crate::command::netns::{host_link_up, netns_delete, netns_link_address, netns_link_up};
use crate::command::switch::attach_to_switch;
use crate::command::Command;

/// What to do with a node's namespace handle after a host device was moved
/// into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlePolicy {
    /// Leave the handle in place; teardown removes it
    #[default]
    Keep,
    /// Run `ip netns del <node>` right after the move (container nodes only).
    /// Later interfaces of the same node can no longer be wired by name.
    Release,
}

/// Host-side name of the veth end attaching `node` to `switch`.
///
/// Bridge attachment refers to this exact name, so it is never formatted
/// inline anywhere else.
///
/// # Examples
/// ```
/// use tinet::topology::links::bridge_peer_name;
///
/// assert_eq!(bridge_peer_name("B0", "R1"), "B0-R1");
/// ```
pub fn bridge_peer_name(switch: &str, node: &str) -> String {
    format!("{}-{}", switch, node)
}

/// Wire one interface of `node`.
///
/// # Arguments
/// * `node` - Name of the owning node
/// * `kind` - Kind of the owning node
/// * `interface` - Local interface name
/// * `link` - Parsed link kind and arguments
/// * `addr` - Optional hardware address for the local end
/// * `policy` - Handle policy for veth/phys migrations
pub fn resolve_link(
    node: &str,
    kind: NodeKind,
    interface: &str,
    link: &Link,
    addr: Option<&str>,
    policy: HandlePolicy,
) -> Vec<Command> {
    let mut cmds = match link {
        Link::Direct {
            peer_node,
            peer_interface,
        } => direct_link(node, interface, peer_node, peer_interface),
        Link::Bridge { switch } => bridge_link(node, interface, switch),
        Link::Veth { peer } => veth_link(node, kind, interface, peer, policy),
        Link::Phys => migrate_into_namespace(node, kind, interface, policy),
    };

    // The address goes on the local end once it is up. Veth/phys ends are
    // migrated before, so with a released handle they can't be addressed.
    if let Some(addr) = addr {
        let releases = kind == NodeKind::Container
            && policy == HandlePolicy::Release
            && matches!(link, Link::Veth { .. } | Link::Phys);
        if !releases {
            let at = match link {
                Link::Veth { .. } => cmds.len() - 1,
                _ => cmds.len(),
            };
            cmds.insert(at, netns_link_address(node, interface, addr));
        }
    }

    cmds
}

/// Veth pair with one end in each node's namespace
#[rustfmt::skip]
pub fn direct_link(
    node: &str,
    interface: &str,
    peer_node: &str,
    peer_interface: &str,
) -> Vec<Command> {
    vec![
        Command::new("ip").args([
            "link", "add", interface, "netns", node,
            "type", "veth", "peer", "name", peer_interface, "netns", peer_node,
        ]),
        netns_link_up(node, interface),
        netns_link_up(peer_node, peer_interface),
    ]
}

/// Veth pair from the node's namespace to a port on `switch`
#[rustfmt::skip]
pub fn bridge_link(node: &str, interface: &str, switch: &str) -> Vec<Command> {
    let peer = bridge_peer_name(switch, node);
    vec![
        Command::new("ip").args([
            "link", "add", interface, "netns", node,
            "type", "veth", "peer", "name", peer.as_str(),
        ]),
        netns_link_up(node, interface),
        host_link_up(&peer),
        attach_to_switch(&peer, switch),
    ]
}

/// Veth pair created on the host; the local end moves into the node and the
/// peer stays on the host
pub fn veth_link(
    node: &str,
    kind: NodeKind,
    interface: &str,
    peer: &str,
    policy: HandlePolicy,
) -> Vec<Command> {
    let mut cmds = vec![
        Command::new("ip").args(["link", "add", interface, "type", "veth", "peer", "name", peer]),
    ];
    cmds.extend(migrate_into_namespace(node, kind, interface, policy));
    cmds.push(host_link_up(peer));
    cmds
}

/// Move an existing host device into the node's namespace and bring it up.
///
/// Under [`HandlePolicy::Release`] a container node's handle is deleted
/// afterwards. A namespace node is never deleted here since the handle is
/// the node itself.
pub fn migrate_into_namespace(
    node: &str,
    kind: NodeKind,
    device: &str,
    policy: HandlePolicy,
) -> Vec<Command> {
    let mut cmds = vec![
        Command::new("ip").args(["link", "set", "dev", device, "netns", node]),
        netns_link_up(node, device),
    ];
    match (kind, policy) {
        (NodeKind::Container, HandlePolicy::Release) => cmds.push(netns_delete(node)),
        (NodeKind::Container, HandlePolicy::Keep) | (NodeKind::Namespace, _) => {}
    }
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(cmds: &[Command]) -> Vec<String> {
        cmds.iter().map(Command::to_shell).collect()
    }

    #[test]
    fn test_direct_link() {
        let link = Link::Direct {
            peer_node: "C1".to_string(),
            peer_interface: "net0".to_string(),
        };
        let cmds = resolve_link("R1", NodeKind::Container, "net0", &link, None, HandlePolicy::Keep);
        assert_eq!(
            shell(&cmds),
            vec![
                "ip link add net0 netns R1 type veth peer name net0 netns C1",
                "ip netns exec R1 ip link set net0 up",
                "ip netns exec C1 ip link set net0 up",
            ]
        );
    }

    #[test]
    fn test_direct_link_with_address() {
        let link = Link::Direct {
            peer_node: "C1".to_string(),
            peer_interface: "eth1".to_string(),
        };
        let cmds = resolve_link(
            "R1",
            NodeKind::Container,
            "net0",
            &link,
            Some("02:00:00:00:00:01"),
            HandlePolicy::Keep,
        );
        assert_eq!(cmds.len(), 4);
        assert_eq!(
            cmds[3].to_shell(),
            "ip netns exec R1 ip link set net0 address 02:00:00:00:00:01"
        );
    }

    #[test]
    fn test_bridge_link() {
        let link = Link::Bridge {
            switch: "B0".to_string(),
        };
        let cmds = resolve_link("R1", NodeKind::Namespace, "net1", &link, None, HandlePolicy::Keep);
        assert_eq!(
            shell(&cmds),
            vec![
                "ip link add net1 netns R1 type veth peer name B0-R1",
                "ip netns exec R1 ip link set net1 up",
                "ip link set B0-R1 up",
                "ip link set dev B0-R1 master B0",
            ]
        );
    }

    #[test]
    fn test_bridge_link_with_address() {
        let link = Link::Bridge {
            switch: "B0".to_string(),
        };
        let cmds = resolve_link(
            "R1",
            NodeKind::Container,
            "net1",
            &link,
            Some("02:00:00:00:00:03"),
            HandlePolicy::Keep,
        );
        assert_eq!(
            shell(&cmds),
            vec![
                "ip link add net1 netns R1 type veth peer name B0-R1",
                "ip netns exec R1 ip link set net1 up",
                "ip link set B0-R1 up",
                "ip link set dev B0-R1 master B0",
                "ip netns exec R1 ip link set net1 address 02:00:00:00:00:03",
            ]
        );
    }

    #[test]
    fn test_veth_link_keeps_handle() {
        let link = Link::Veth {
            peer: "peer0".to_string(),
        };
        let cmds = resolve_link("R1", NodeKind::Container, "net2", &link, None, HandlePolicy::Keep);
        assert_eq!(
            shell(&cmds),
            vec![
                "ip link add net2 type veth peer name peer0",
                "ip link set dev net2 netns R1",
                "ip netns exec R1 ip link set net2 up",
                "ip link set peer0 up",
            ]
        );
    }

    #[test]
    fn test_veth_link_address_before_peer_up() {
        let link = Link::Veth {
            peer: "peer0".to_string(),
        };
        let cmds = resolve_link(
            "R1",
            NodeKind::Container,
            "net2",
            &link,
            Some("02:00:00:00:00:02"),
            HandlePolicy::Keep,
        );
        assert_eq!(cmds.len(), 5);
        assert_eq!(
            cmds[3].to_shell(),
            "ip netns exec R1 ip link set net2 address 02:00:00:00:00:02"
        );
        assert_eq!(cmds[4].to_shell(), "ip link set peer0 up");
    }

    #[test]
    fn test_phys_link_release_policy() {
        let cmds = resolve_link(
            "R1",
            NodeKind::Container,
            "eth1",
            &Link::Phys,
            None,
            HandlePolicy::Release,
        );
        assert_eq!(
            shell(&cmds),
            vec![
                "ip link set dev eth1 netns R1",
                "ip netns exec R1 ip link set eth1 up",
                "ip netns del R1",
            ]
        );

        // never delete a namespace node
        let cmds = resolve_link(
            "C1",
            NodeKind::Namespace,
            "eth1",
            &Link::Phys,
            None,
            HandlePolicy::Release,
        );
        assert_eq!(cmds.len(), 2);
    }

    #[test]
    fn test_bridge_peer_name() {
        assert_eq!(bridge_peer_name("B0", "R1"), "B0-R1");
        assert_ne!(bridge_peer_name("B0", "R1"), bridge_peer_name("R1", "B0"));
    }
}
