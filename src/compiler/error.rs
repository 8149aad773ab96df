//! Compilation errors.

/// Reasons a unit of the topology can't be compiled
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("No such {kind} '{name}'")]
    UnresolvableReference { kind: &'static str, name: String },

    #[error("Node '{node}' has unsupported type '{kind}' (expected docker or netns)")]
    UnsupportedNodeKind { node: String, kind: String },

    #[error(
        "Interface {node}:{interface} has unsupported type '{kind}' \
         (expected direct, bridge, veth or phys)"
    )]
    UnsupportedLinkKind {
        node: String,
        interface: String,
        kind: String,
    },

    #[error("Interface {node}:{interface} has malformed args: {reason}")]
    MalformedArgument {
        node: String,
        interface: String,
        reason: String,
    },

    #[error("Container node '{node}' has no image")]
    MissingImage { node: String },

    #[error("Node '{node}' attaches to switch '{switch}' more than once")]
    DuplicateBridgePeer { node: String, switch: String },

    #[error("Interface {node}:{interface} links to node '{peer}', which can't be created")]
    UncreatablePeer {
        node: String,
        interface: String,
        peer: String,
    },
}
