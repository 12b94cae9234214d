//! Value objects representing immutable domain concepts.

pub mod instance_id;

pub use instance_id::InstanceId;
