//! Shared utilities: load-time validation and order-preserving dedup.

pub mod dedup;
pub mod validation;

pub use dedup::unique_in_order;
pub use validation::{validate_hardware_address, validate_interface_names, validate_unique_names};
