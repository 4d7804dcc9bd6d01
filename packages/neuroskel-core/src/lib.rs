//! neuroskel-core: neuron skeleton data model and canonicalization
//!
//! The exchange formats handled by `neuroskel-io` store skeleton topology
//! as an unordered, undirected edge list. This crate owns the part with an
//! algorithmic contract: deterministically reconstructing a single-root,
//! parent-pointer tree from that edge list ([`canonicalize`]), plus the
//! skeleton record types the I/O layer produces and consumes.
//!
//! The crate is pure: no filesystem, XML, or archive handling lives here.

/// Graph→tree canonicalization core
pub mod canonical;

/// Error types
pub mod errors;

/// Shared skeleton models
pub mod models;

pub use canonical::{canonicalize, Canonicalized, TopologyPolicy};
pub use errors::{Result, SkeletonError};
pub use models::{
    Edge, ExportedTable, RawNode, SkeletonMeta, SkeletonNode, TableRow, TreeSkeleton,
    ROOT_SENTINEL,
};
