//! Sample topology written by `tinet init`.

use crate::config::{Cmd, HookGroup, Interface, Node, NodeConfig, Switch, Sysctl, Test, Topology};

fn interface(name: &str, kind: &str, args: Option<&str>) -> Interface {
    Interface {
        name: name.to_string(),
        kind: kind.to_string(),
        args: args.map(str::to_string),
        addr: None,
    }
}

/// A small topology touching every feature: a container router with one
/// interface of each link kind, a namespace host, a bridge, node configs
/// and tests.
pub fn sample_topology() -> Topology {
    Topology {
        precmd: vec![HookGroup {
            cmds: vec![Cmd::new("export IMAGE=slankdev/ubuntu:18.04")],
        }],
        preinit: vec![HookGroup {
            cmds: vec![Cmd::new("modprobe br_netfilter")],
        }],
        postinit: vec![HookGroup {
            cmds: vec![Cmd::new("echo topology is up")],
        }],
        postfini: vec![HookGroup {
            cmds: vec![Cmd::new("echo topology is down")],
        }],
        nodes: vec![
            Node {
                name: "R1".to_string(),
                image: Some("slankdev/ubuntu:18.04".to_string()),
                interfaces: vec![
                    interface("net0", "direct", Some("C1#net0")),
                    interface("net1", "bridge", Some("B0")),
                    interface("net2", "veth", Some("peer0")),
                    interface("net3", "phys", None),
                ],
                sysctls: vec![Sysctl::new("net.ipv4.ip_forward=1")],
                ..Default::default()
            },
            Node {
                name: "C1".to_string(),
                node_type: Some("netns".to_string()),
                ..Default::default()
            },
            Node {
                name: "C2".to_string(),
                node_type: Some("netns".to_string()),
                interfaces: vec![interface("net0", "bridge", Some("B0"))],
                ..Default::default()
            },
        ],
        switches: vec![Switch {
            name: "B0".to_string(),
            interfaces: vec![
                interface("net1", "docker", Some("R1")),
                interface("net0", "netns", Some("C2")),
            ],
        }],
        node_configs: vec![
            NodeConfig {
                name: "R1".to_string(),
                cmds: vec![
                    Cmd::new("ip addr add 10.0.0.1/24 dev net0"),
                    Cmd::new("ip addr add 10.1.0.1/24 dev net1"),
                ],
            },
            NodeConfig {
                name: "C1".to_string(),
                cmds: vec![
                    Cmd::new("ip addr add 10.0.0.2/24 dev net0"),
                    Cmd::new("ip route add default via 10.0.0.1"),
                ],
            },
            NodeConfig {
                name: "C2".to_string(),
                cmds: vec![
                    Cmd::new("ip addr add 10.1.0.2/24 dev net0"),
                    Cmd::new("ip route add default via 10.1.0.1"),
                ],
            },
        ],
        test: vec![
            Test {
                name: "p2p".to_string(),
                cmds: vec![Cmd::new("ip netns exec C1 ping -c2 10.0.0.1")],
            },
            Test {
                name: "routed".to_string(),
                cmds: vec![Cmd::new("ip netns exec C1 ping -c2 10.1.0.2")],
            },
        ],
    }
}

/// The sample topology as YAML
pub fn generate_template() -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&sample_topology())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;

    #[test]
    fn test_template_round_trips() {
        let yaml = generate_template().unwrap();
        let parsed: Topology = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, sample_topology());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_template_compiles_cleanly() {
        let topology = sample_topology();
        let compiler = Compiler::new(&topology);

        let up = compiler.up().unwrap();
        assert!(up.diagnostics.is_empty());
        assert!(compiler.conf().unwrap().diagnostics.is_empty());
        assert!(!compiler.down().unwrap().is_empty());
        assert_eq!(compiler.tests(None).unwrap().len(), 2);
    }
}
