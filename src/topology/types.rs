//! Typed views over the declarative model.
//!
//! Node and interface type tags are free-form strings in the topology file.
//! They are resolved here into closed enums so every later stage can match
//! exhaustively instead of falling through to a default branch.

use crate::compiler::CompileError;
use crate::config::{Interface, Node};

/// Isolation mechanism backing a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Privileged docker container (the default)
    Container,
    /// Bare `ip netns` network namespace
    Namespace,
}

impl NodeKind {
    /// Resolve the kind of a node from its `type` tag.
    ///
    /// A missing or empty tag, `docker` and `container` select a container;
    /// `netns` and `namespace` select a namespace. Anything else is an
    /// [`CompileError::UnsupportedNodeKind`].
    pub fn of(node: &Node) -> Result<Self, CompileError> {
        match node.node_type.as_deref().map(str::trim) {
            None | Some("") | Some("docker") | Some("container") => Ok(NodeKind::Container),
            Some("netns") | Some("namespace") => Ok(NodeKind::Namespace),
            Some(other) => Err(CompileError::UnsupportedNodeKind {
                node: node.name.clone(),
                kind: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Container => "container",
            NodeKind::Namespace => "namespace",
        }
    }
}

/// Wiring strategy of a node interface, with its parsed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    /// Veth pair straight into another node's namespace
    Direct {
        peer_node: String,
        peer_interface: String,
    },
    /// Veth pair whose host end is enslaved to a bridge
    Bridge { switch: String },
    /// Veth pair created on the host, local end moved into the node
    Veth { peer: String },
    /// Existing host device moved into the node
    Phys,
}

impl Link {
    /// Parse the `type`/`args` pair of an interface owned by `node`.
    ///
    /// # Examples
    /// ```
    /// use tinet::config::Interface;
    /// use tinet::topology::Link;
    ///
    /// let iface = Interface {
    ///     name: "net0".to_string(),
    ///     kind: "direct".to_string(),
    ///     args: Some("C1#net0".to_string()),
    ///     addr: None,
    /// };
    /// let link = Link::parse("R1", &iface).unwrap();
    /// assert_eq!(link, Link::Direct {
    ///     peer_node: "C1".to_string(),
    ///     peer_interface: "net0".to_string(),
    /// });
    /// ```
    pub fn parse(node: &str, iface: &Interface) -> Result<Self, CompileError> {
        let malformed = |reason: &str| CompileError::MalformedArgument {
            node: node.to_string(),
            interface: iface.name.clone(),
            reason: reason.to_string(),
        };
        let args = iface.args.as_deref().map(str::trim).unwrap_or("");

        match iface.kind.trim() {
            "direct" => {
                let (peer_node, peer_interface) = args
                    .split_once('#')
                    .ok_or_else(|| malformed("expected 'peer#interface'"))?;
                if peer_node.is_empty() || peer_interface.is_empty() {
                    return Err(malformed("peer node and peer interface must both be set"));
                }
                if peer_interface.contains('#') {
                    return Err(malformed("more than one '#' delimiter"));
                }
                Ok(Link::Direct {
                    peer_node: peer_node.to_string(),
                    peer_interface: peer_interface.to_string(),
                })
            }
            "bridge" => {
                if args.is_empty() {
                    return Err(malformed("expected a switch name"));
                }
                Ok(Link::Bridge {
                    switch: args.to_string(),
                })
            }
            "veth" => {
                if args.is_empty() {
                    return Err(malformed("expected a peer interface name"));
                }
                Ok(Link::Veth {
                    peer: args.to_string(),
                })
            }
            "phys" => Ok(Link::Phys),
            other => Err(CompileError::UnsupportedLinkKind {
                node: node.to_string(),
                interface: iface.name.clone(),
                kind: other.to_string(),
            }),
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Link::Direct { .. } => "direct",
            Link::Bridge { .. } => "bridge",
            Link::Veth { .. } => "veth",
            Link::Phys => "phys",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(kind: &str, args: Option<&str>) -> Interface {
        Interface {
            name: "net0".to_string(),
            kind: kind.to_string(),
            args: args.map(str::to_string),
            addr: None,
        }
    }

    fn node(node_type: Option<&str>) -> Node {
        Node {
            name: "R1".to_string(),
            node_type: node_type.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_node_kind_aliases() {
        assert_eq!(NodeKind::of(&node(None)).unwrap(), NodeKind::Container);
        assert_eq!(NodeKind::of(&node(Some(""))).unwrap(), NodeKind::Container);
        assert_eq!(NodeKind::of(&node(Some("docker"))).unwrap(), NodeKind::Container);
        assert_eq!(NodeKind::of(&node(Some("container"))).unwrap(), NodeKind::Container);
        assert_eq!(NodeKind::of(&node(Some("netns"))).unwrap(), NodeKind::Namespace);
        assert_eq!(NodeKind::of(&node(Some("namespace"))).unwrap(), NodeKind::Namespace);
    }

    #[test]
    fn test_unsupported_node_kind() {
        assert_eq!(
            NodeKind::of(&node(Some("vm"))),
            Err(CompileError::UnsupportedNodeKind {
                node: "R1".to_string(),
                kind: "vm".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_direct() {
        let link = Link::parse("R1", &iface("direct", Some("X#y"))).unwrap();
        assert_eq!(
            link,
            Link::Direct {
                peer_node: "X".to_string(),
                peer_interface: "y".to_string()
            }
        );
    }

    #[test]
    fn test_parse_direct_malformed() {
        for args in [None, Some("C1"), Some("#net0"), Some("C1#"), Some("C1#net0#x")] {
            let err = Link::parse("R1", &iface("direct", args)).unwrap_err();
            match err {
                CompileError::MalformedArgument { node, interface, .. } => {
                    assert_eq!(node, "R1");
                    assert_eq!(interface, "net0");
                }
                other => panic!("unexpected error for {:?}: {:?}", args, other),
            }
        }
    }

    #[test]
    fn test_parse_other_kinds() {
        assert_eq!(
            Link::parse("R1", &iface("bridge", Some("B0"))).unwrap(),
            Link::Bridge {
                switch: "B0".to_string()
            }
        );
        assert_eq!(
            Link::parse("R1", &iface("veth", Some("peer0"))).unwrap(),
            Link::Veth {
                peer: "peer0".to_string()
            }
        );
        assert_eq!(Link::parse("R1", &iface("phys", None)).unwrap(), Link::Phys);
        assert!(Link::parse("R1", &iface("bridge", None)).is_err());
        assert!(Link::parse("R1", &iface("veth", Some(""))).is_err());
    }

    #[test]
    fn test_unsupported_link_kind() {
        assert!(matches!(
            Link::parse("R1", &iface("vxlan", Some("x"))),
            Err(CompileError::UnsupportedLinkKind { kind, .. }) if kind == "vxlan"
        ));
    }
}
