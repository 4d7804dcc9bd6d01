//! Batch reading
//!
//! Expands a file or folder path into individual decode calls, serial or
//! parallel. Each unit of work is self-contained (one file in, one
//! outcome out), so the pool needs no shared state. Per-item failures in
//! folder mode are caught, warned about, and recorded as typed skips;
//! a direct file path propagates its error to the caller.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use neuroskel_core::TreeSkeleton;

use crate::archive::{NmxReader, Payload, ReadOutcome, SkipReason, SourceItem};
use crate::config::ReadOptions;
use crate::errors::Result;
use crate::reader::NmlReader;
use crate::warn::{default_sink, SharedSink, WarningSink};

/// Ordered collection of per-input outcomes from a batch read.
#[derive(Debug, Default)]
pub struct SkeletonBatch {
    outcomes: Vec<ReadOutcome>,
}

impl SkeletonBatch {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[ReadOutcome] {
        &self.outcomes
    }

    /// Successfully decoded skeletons, in input order.
    pub fn skeletons(&self) -> impl Iterator<Item = &TreeSkeleton> {
        self.outcomes.iter().filter_map(ReadOutcome::as_skeleton)
    }

    /// Consume the batch, dropping skipped slots.
    pub fn into_skeletons(self) -> Vec<TreeSkeleton> {
        self.outcomes
            .into_iter()
            .filter_map(ReadOutcome::skeleton)
            .collect()
    }

    /// Skip reasons, in input order.
    pub fn skipped(&self) -> impl Iterator<Item = &SkipReason> {
        self.outcomes.iter().filter_map(ReadOutcome::skip_reason)
    }
}

impl FromIterator<ReadOutcome> for SkeletonBatch {
    fn from_iter<I: IntoIterator<Item = ReadOutcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SkeletonBatch {
    type Item = ReadOutcome;
    type IntoIter = std::vec::IntoIter<ReadOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

/// Read NML file(s) from a path.
///
/// A file path decodes that single file and propagates any error; a
/// folder path decodes every `.nml` file in it (subdirectories behind
/// `options.include_subdirs`), catching per-item failures as skips.
pub fn read_nml(path: impl AsRef<Path>, options: &ReadOptions) -> Result<SkeletonBatch> {
    read_nml_with(path, options, default_sink())
}

/// [`read_nml`] with an explicit warning sink.
pub fn read_nml_with(
    path: impl AsRef<Path>,
    options: &ReadOptions,
    sink: SharedSink,
) -> Result<SkeletonBatch> {
    let path = path.as_ref();
    if path.is_dir() {
        let files = discover_files(path, "nml", options)?;
        run_batch(files, options, &sink, |file, options, sink| {
            NmlReader::new(options.clone())
                .with_sink(sink.clone())
                .read_file(file)
                .map(ReadOutcome::Skeleton)
        })
    } else {
        let tree = NmlReader::new(options.clone())
            .with_sink(sink)
            .read_file(path)?;
        Ok(std::iter::once(ReadOutcome::Skeleton(tree)).collect())
    }
}

/// Read NMX archive(s) from a path.
///
/// Same path semantics as [`read_nml`]. Archives without a qualifying
/// skeleton member yield typed skips, not errors, so a batch over a
/// large collection keeps going.
pub fn read_nmx(path: impl AsRef<Path>, options: &ReadOptions) -> Result<SkeletonBatch> {
    read_nmx_with(path, options, default_sink())
}

/// [`read_nmx`] with an explicit warning sink.
pub fn read_nmx_with(
    path: impl AsRef<Path>,
    options: &ReadOptions,
    sink: SharedSink,
) -> Result<SkeletonBatch> {
    let path = path.as_ref();
    if path.is_dir() {
        let files = discover_files(path, "nmx", options)?;
        run_batch(files, options, &sink, |file, options, sink| {
            NmxReader::new(options.clone())
                .with_sink(sink.clone())
                .read_file(file)
        })
    } else {
        let outcome = NmxReader::new(options.clone())
            .with_sink(sink)
            .read_file(path)?;
        Ok(std::iter::once(outcome).collect())
    }
}

/// Decode pre-loaded NML sources (e.g. members already pulled out of
/// some other container). Batch semantics: per-item failures become
/// skips.
pub fn read_nml_sources(
    sources: Vec<SourceItem>,
    options: &ReadOptions,
    sink: SharedSink,
) -> SkeletonBatch {
    sources
        .into_iter()
        .map(|item| {
            let reader = NmlReader::new(options.clone()).with_sink(sink.clone());
            let result = match &item.payload {
                Payload::Binary(bytes) => std::str::from_utf8(bytes)
                    .map_err(Into::into)
                    .and_then(|text| reader.read_str_with(text, Some(item.path.clone()), None)),
                Payload::Text(text) => reader.read_str_with(text, Some(item.path.clone()), None),
            };
            collapse(result.map(ReadOutcome::Skeleton), &item.path, &sink)
        })
        .collect()
}

/// Decode pre-loaded NMX sources. Text payloads are recorded as skips:
/// the archive reader only accepts binary input.
pub fn read_nmx_sources(
    sources: Vec<SourceItem>,
    options: &ReadOptions,
    sink: SharedSink,
) -> SkeletonBatch {
    sources
        .into_iter()
        .map(|item| {
            let reader = NmxReader::new(options.clone()).with_sink(sink.clone());
            collapse(reader.read_payload(&item), &item.path, &sink)
        })
        .collect()
}

/// Batch policy: errors never abort the batch, they become warnings plus
/// typed skips.
fn collapse(result: Result<ReadOutcome>, path: &Path, sink: &SharedSink) -> ReadOutcome {
    match result {
        Ok(outcome) => outcome,
        Err(err) => {
            let reason = SkipReason::ReadFailed {
                path: path.to_path_buf(),
                error: err.to_string(),
            };
            sink.warn(&reason.to_string());
            ReadOutcome::Skipped(reason)
        }
    }
}

/// Expand a folder into its skeleton files: extension match, optional
/// recursion, stable name order, optional cap.
fn discover_files(root: &Path, extension: &str, options: &ReadOptions) -> Result<Vec<PathBuf>> {
    let max_depth = if options.include_subdirs {
        usize::MAX
    } else {
        1
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path.to_path_buf());
        }
    }

    if let Some(limit) = options.limit {
        files.truncate(limit);
    }
    debug!("discovered {} .{extension} file(s) under {}", files.len(), root.display());

    Ok(files)
}

/// Run one decode per file, serial or on a scoped worker pool.
fn run_batch<F>(
    files: Vec<PathBuf>,
    options: &ReadOptions,
    sink: &SharedSink,
    decode: F,
) -> Result<SkeletonBatch>
where
    F: Fn(&Path, &ReadOptions, &SharedSink) -> Result<ReadOutcome> + Send + Sync,
{
    let workers = options.parallel.workers_for(files.len());

    let outcomes: Vec<ReadOutcome> = match workers {
        Some(n) => {
            match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => pool.install(|| {
                    files
                        .par_iter()
                        .map(|file| collapse(decode(file, options, sink), file, sink))
                        .collect()
                }),
                Err(err) => {
                    // Pool construction failing is no reason to drop the
                    // batch; fall back to a serial pass.
                    sink.warn(&format!("worker pool unavailable ({err}), reading serially"));
                    files
                        .iter()
                        .map(|file| collapse(decode(file, options, sink), file, sink))
                        .collect()
                }
            }
        }
        None => files
            .iter()
            .map(|file| collapse(decode(file, options, sink), file, sink))
            .collect(),
    };

    Ok(SkeletonBatch { outcomes })
}
