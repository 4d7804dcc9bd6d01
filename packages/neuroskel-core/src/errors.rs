//! Error types for neuroskel-core
//!
//! Structural defects in a decoded skeleton graph. I/O-level failures
//! live in `neuroskel-io`.

use thiserror::Error;

use crate::models::Edge;

/// Structural error raised while turning raw node/edge tables into a tree.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SkeletonError {
    /// The node table is empty.
    #[error("skeleton has no nodes")]
    EmptySkeleton,

    /// An edge references a node id that is not in the node table.
    #[error("edge ({source_id}, {target}) references unknown node {unknown}")]
    DanglingEdge {
        source_id: i64,
        target: i64,
        unknown: i64,
    },

    /// The node table contains the same id twice.
    #[error("duplicate node id {0}")]
    DuplicateNode(i64),

    /// The edge set does not describe a single spanning tree.
    #[error(
        "edges do not form a spanning tree: {} unreached node(s), {} unrealized edge(s)",
        unreached.len(),
        unrealized.len()
    )]
    MalformedTopology {
        /// Nodes never reached from the traversal start.
        unreached: Vec<i64>,
        /// Input edges that ended up as neither parent→child nor child→parent.
        unrealized: Vec<Edge>,
    },

    /// A node table handed to `TreeSkeleton::new` has the wrong number of roots.
    #[error("expected exactly one root node, found {0}")]
    RootCount(usize),

    /// A node's parent id does not exist in the table.
    #[error("node {node} has parent {parent} which is not in the table")]
    InvalidParent { node: i64, parent: i64 },

    /// A metadata extension key collides with a named metadata field.
    #[error("reserved metadata key `{0}`")]
    ReservedMetaKey(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, SkeletonError>;
