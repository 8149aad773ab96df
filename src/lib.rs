//! # tinet - Virtual network topologies from a YAML file
//!
//! This library compiles a declarative description of a virtual network
//! (docker containers and network namespaces, linux bridges, veth links)
//! into the ordered shell commands that build, configure, test and tear
//! down that network on a single host.
//!
//! ## Overview
//!
//! Nothing is executed here. Every subcommand prints a script that is meant
//! to be piped into a shell:
//!
//! ```bash
//! tinet up -c spec.yaml | sudo sh -x
//! tinet conf -c spec.yaml | sudo sh -x
//! tinet test -c spec.yaml | sudo sh -x
//! tinet down -c spec.yaml | sudo sh -x
//! ```
//!
//! ## Architecture
//!
//! - `config`: Topology model and load-time validation errors
//! - `config_loader`: YAML loading
//! - `topology`: Typed node kinds and links, link resolution
//! - `command`: Structured command intents and per-resource emitters
//! - `compiler`: Phase ordering, scripts and diagnostics
//! - `script`: Script rendering (shell or JSON)
//! - `template`: Sample topology for `tinet init`
//! - `utils`: Validation and dedup helpers
//!
//! ## Example Usage
//!
//! ```rust
//! use tinet::compiler::Compiler;
//! use tinet::config_loader::parse_config;
//!
//! let topology = parse_config(r#"
//! nodes:
//!   - name: R1
//!     image: slankdev/frr
//!     interfaces:
//!       - { name: net0, type: bridge, args: B0 }
//! switches:
//!   - name: B0
//! "#)?;
//!
//! let script = Compiler::new(&topology).up()?;
//! assert!(script.to_text(false).contains("ip link set dev B0-R1 master B0"));
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```
//!
//! ## Topology Format
//!
//! ```yaml
//! nodes:
//!   - name: R1
//!     image: slankdev/frr
//!     interfaces:
//!       - { name: net0, type: direct, args: C1#net0 }
//!       - { name: net1, type: bridge, args: B0 }
//!   - name: C1
//!     type: netns
//!     interfaces:
//!       - { name: net0, type: direct, args: R1#net0 }
//! switches:
//!   - name: B0
//! node_configs:
//!   - name: C1
//!     cmds:
//!       - cmd: ip addr add 10.0.0.2/24 dev net0
//! test:
//!   - name: p2p
//!     cmds:
//!       - cmd: ip netns exec C1 ping -c2 10.0.0.1
//! ```
//!
//! ## Error Handling
//!
//! Library errors are `thiserror` enums ([`compiler::CompileError`],
//! [`config::ValidationError`]); the loader and the binary report them
//! through `color_eyre`.

pub mod command;
pub mod compiler;
pub mod config;
pub mod config_loader;
pub mod script;
pub mod template;
pub mod topology;
pub mod utils;
