//! Common types shared by all aggregates

pub mod node_id;

// Re-exports
pub use node_id::NodeId;
