//! NMX archive adapter (decode only)
//!
//! An NMX file is a zip container holding the files of one annotation
//! job; the skeleton lives in a member named `*skeleton*.nml`. The
//! adapter locates exactly one qualifying member and hands its bytes to
//! the NML pipeline. Archives with no qualifying member are routinely
//! seen in large collections, so that case is a warning plus a typed
//! skip, never an error. Writing NMX archives is not supported.

use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use neuroskel_core::TreeSkeleton;

use crate::config::ReadOptions;
use crate::errors::{NmlError, Result};
use crate::reader::NmlReader;
use crate::warn::{default_sink, SharedSink, WarningSink};

/// Member name suffix a skeleton source must carry.
const SKELETON_EXT: &str = ".nml";
/// Member name marker a skeleton source must contain.
const SKELETON_MARKER: &str = "skeleton";

/// Result of one decode attempt: a skeleton, or a typed reason why the
/// slot is empty. Batch filtering works on this instead of probing for
/// absent values.
#[derive(Debug)]
pub enum ReadOutcome {
    Skeleton(TreeSkeleton),
    Skipped(SkipReason),
}

impl ReadOutcome {
    pub fn is_skeleton(&self) -> bool {
        matches!(self, ReadOutcome::Skeleton(_))
    }

    pub fn skeleton(self) -> Option<TreeSkeleton> {
        match self {
            ReadOutcome::Skeleton(tree) => Some(tree),
            ReadOutcome::Skipped(_) => None,
        }
    }

    pub fn as_skeleton(&self) -> Option<&TreeSkeleton> {
        match self {
            ReadOutcome::Skeleton(tree) => Some(tree),
            ReadOutcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            ReadOutcome::Skeleton(_) => None,
            ReadOutcome::Skipped(reason) => Some(reason),
        }
    }
}

/// Why a batch slot holds no skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No archive member matched `*skeleton*.nml`.
    NoSkeletonMember { archive: String },
    /// Reading one input failed and the batch carried on.
    ReadFailed { path: PathBuf, error: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoSkeletonMember { archive } => {
                write!(f, "no skeleton member in \"{archive}\"")
            }
            SkipReason::ReadFailed { path, error } => {
                write!(f, "failed to read {}: {error}", path.display())
            }
        }
    }
}

/// One pre-loaded unit of batch input.
#[derive(Debug, Clone)]
pub struct SourceItem {
    pub path: PathBuf,
    pub payload: Payload,
}

/// Buffer contents of a source: NML accepts either form, NMX requires
/// binary.
#[derive(Debug, Clone)]
pub enum Payload {
    Binary(Vec<u8>),
    Text(String),
}

/// Reader for NMX archives.
pub struct NmxReader {
    options: ReadOptions,
    sink: SharedSink,
}

impl NmxReader {
    pub fn new(options: ReadOptions) -> Self {
        Self {
            options,
            sink: default_sink(),
        }
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Decode the qualifying skeleton member of an archive given as
    /// bytes. `origin` names the archive in warnings and is recorded
    /// nowhere else.
    pub fn read_bytes(&self, bytes: &[u8], origin: Option<&Path>) -> Result<ReadOutcome> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        for index in 0..archive.len() {
            let mut member = archive.by_index(index)?;
            if member.is_dir() {
                continue;
            }
            let name = member.name().to_string();
            if !(name.ends_with(SKELETON_EXT) && name.contains(SKELETON_MARKER)) {
                continue;
            }

            // First qualifying member wins; any later ones are ignored.
            let mut content = Vec::with_capacity(member.size() as usize);
            member.read_to_end(&mut content)?;

            let archive_id = top_segment(&name).to_string();
            let reader = NmlReader::new(self.options.clone())
                .with_sink(self.sink.clone())
                .with_name_fallback("NMX");
            let tree = reader.read_str_with(
                std::str::from_utf8(&content)?,
                Some(PathBuf::from(&name)),
                Some(archive_id),
            )?;
            return Ok(ReadOutcome::Skeleton(tree));
        }

        let label = archive_label(origin, &archive);
        self.sink.warn(&format!(
            "Skipped \"{label}.nmx\": failed to import skeleton."
        ));
        Ok(ReadOutcome::Skipped(SkipReason::NoSkeletonMember {
            archive: label,
        }))
    }

    /// Decode an NMX file from disk. The file handle is scoped to this
    /// call and released on every exit path.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<ReadOutcome> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        self.read_bytes(&bytes, Some(path))
    }

    /// Decode a pre-loaded source. NMX is a binary container: a text
    /// payload fails with [`NmlError::InputType`].
    pub fn read_payload(&self, item: &SourceItem) -> Result<ReadOutcome> {
        match &item.payload {
            Payload::Binary(bytes) => self.read_bytes(bytes, Some(&item.path)),
            Payload::Text(_) => Err(NmlError::InputType("text")),
        }
    }
}

/// Top-level path segment of an archive member name.
fn top_segment(name: &str) -> &str {
    name.split('/').next().unwrap_or(name)
}

/// Name used to identify an archive in warnings: the file stem when a
/// path is known, otherwise the first member's top-level segment.
fn archive_label<R: Read + std::io::Seek>(origin: Option<&Path>, archive: &ZipArchive<R>) -> String {
    if let Some(stem) = origin.and_then(|p| p.file_stem()).and_then(|s| s.to_str()) {
        return stem.to_string();
    }
    archive
        .file_names()
        .next()
        .map(top_segment)
        .unwrap_or("archive")
        .to_string()
}
