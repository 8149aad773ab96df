//! Network topology module.
//!
//! This module resolves the string-tagged model into typed node kinds and
//! links, and turns each link into its wiring commands.

pub mod links;
pub mod types;

// Re-export key types and functions for easier access
pub use links::{bridge_peer_name, resolve_link, HandlePolicy};
pub use types::{Link, NodeKind};
