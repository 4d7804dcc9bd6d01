//! Shared skeleton models

mod meta;
mod node;
mod tree;

pub use meta::SkeletonMeta;
pub use node::{Edge, RawNode, SkeletonNode, ROOT_SENTINEL};
pub use tree::{ExportedTable, TableRow, TreeSkeleton};
