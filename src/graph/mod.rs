//! Graph identity and dedup layer.
//!
//! Lineage trees are built per reporting field ([`tree`]) and merged into an
//! identity-keyed arena ([`LineageGraph`]) so that shared nodes and edges
//! are rendered once.

pub mod arena;
pub mod node;
pub mod tree;

pub use arena::LineageGraph;
pub use node::{EdgeIdentity, LineageKind, LineageNode, NodeIdentity, NodeMetadata, NodeType};
pub use tree::{build_db_lineage, build_reporting_tree};
