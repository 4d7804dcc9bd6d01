//! neuroskel-io: NML/NMX neuron skeleton exchange
//!
//! Two pipelines over the canonicalization core in `neuroskel-core`:
//!
//! - Decode: raw bytes → XML document → (node table, edge list) →
//!   canonical rooted tree → [`TreeSkeleton`].
//! - Encode: [`TreeSkeleton`] → reindexed node/edge table → XML document
//!   → bytes.
//!
//! Plus a decode-only archive adapter for NMX (zip) containers and batch
//! entry points that expand a folder into parallel decode calls.
//!
//! ```no_run
//! use neuroskel_io::{read_nmx, ReadOptions};
//!
//! let batch = read_nmx("skeletons/", &ReadOptions::new().limit(100))?;
//! for skeleton in batch.skeletons() {
//!     println!("{:?}: {} nodes", skeleton.meta().name, skeleton.len());
//! }
//! # Ok::<(), neuroskel_io::NmlError>(())
//! ```

/// NMX archive adapter and outcome types
pub mod archive;

/// Batch reading
pub mod batch;

/// Read configuration
pub mod config;

/// Error types
pub mod errors;

/// NML decoder
pub mod reader;

/// NML encoder
pub mod writer;

/// Warning sink
pub mod warn;

pub use archive::{NmxReader, Payload, ReadOutcome, SkipReason, SourceItem};
pub use batch::{
    read_nml, read_nml_sources, read_nml_with, read_nmx, read_nmx_sources, read_nmx_with,
    SkeletonBatch,
};
pub use config::{Parallel, Precision, ReadOptions, PARALLEL_THRESHOLD};
pub use errors::{NmlError, Result};
pub use reader::NmlReader;
pub use warn::{CollectSink, SharedSink, TracingSink, WarningSink};
pub use writer::{nml_to_bytes, nml_to_bytes_with_map, write_nml, write_nml_with_map};

// Core types most callers need alongside the readers.
pub use neuroskel_core::{
    Edge, RawNode, SkeletonError, SkeletonMeta, SkeletonNode, TopologyPolicy, TreeSkeleton,
    ROOT_SENTINEL,
};
