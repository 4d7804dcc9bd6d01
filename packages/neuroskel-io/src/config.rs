//! Read configuration
//!
//! Builder-style options shared by the single-file readers and the batch
//! entry points.

use serde::{Deserialize, Serialize};

use neuroskel_core::{SkeletonMeta, TopologyPolicy};

/// File count above which [`Parallel::Auto`] switches to a worker pool.
/// Spawning and joining workers is slower than a serial loop for small
/// imports.
pub const PARALLEL_THRESHOLD: usize = 200;

/// Numeric precision for decoded attribute values.
///
/// Integer ids are range-checked against the selected width; float
/// coordinates are narrowed through `f32` for widths of 32 bits or less.
/// `Infer` keeps native `i64`/`f64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Bits8,
    Bits16,
    #[default]
    Bits32,
    Bits64,
    Infer,
}

impl Precision {
    /// Parse an integer id attribute, enforcing the selected width.
    pub(crate) fn parse_id(self, raw: &str) -> Option<i64> {
        let value: i64 = raw.trim().parse().ok()?;
        let fits = match self {
            Precision::Bits8 => i8::try_from(value).is_ok(),
            Precision::Bits16 => i16::try_from(value).is_ok(),
            Precision::Bits32 => i32::try_from(value).is_ok(),
            Precision::Bits64 | Precision::Infer => true,
        };
        fits.then_some(value)
    }

    /// Parse a float attribute at the selected width.
    pub(crate) fn parse_float(self, raw: &str) -> Option<f64> {
        let raw = raw.trim();
        match self {
            Precision::Bits8 | Precision::Bits16 | Precision::Bits32 => {
                let narrow: f32 = raw.parse().ok()?;
                Some(f64::from(narrow))
            }
            Precision::Bits64 | Precision::Infer => raw.parse().ok(),
        }
    }
}

/// Worker-pool selection for batch reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parallel {
    /// Parallel only above [`PARALLEL_THRESHOLD`] files.
    #[default]
    Auto,
    /// Always serial.
    Off,
    /// Always parallel with the default worker count.
    On,
    /// Always parallel with an explicit worker count.
    Workers(usize),
}

impl Parallel {
    /// Worker count to use for `file_count` inputs; `None` means serial.
    pub(crate) fn workers_for(self, file_count: usize) -> Option<usize> {
        let default_workers = (num_cpus::get() / 2).max(1);
        match self {
            Parallel::Off => None,
            Parallel::Auto => (file_count > PARALLEL_THRESHOLD).then_some(default_workers),
            Parallel::On => Some(default_workers),
            Parallel::Workers(n) => Some(n.max(1)),
        }
    }
}

/// Options for reading NML/NMX data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Numeric precision for decoded values.
    pub precision: Precision,

    /// Also search subdirectories when reading a folder.
    pub include_subdirs: bool,

    /// Worker-pool selection for folder reads.
    pub parallel: Parallel,

    /// Read at most this many files from a folder.
    pub limit: Option<usize>,

    /// Behavior on disconnected or cyclic raw topology.
    pub topology: TopologyPolicy,

    /// Base metadata merged into every skeleton read; caller values win
    /// over reader defaults.
    pub meta: SkeletonMeta,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn include_subdirs(mut self, include: bool) -> Self {
        self.include_subdirs = include;
        self
    }

    pub fn parallel(mut self, parallel: Parallel) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn topology(mut self, policy: TopologyPolicy) -> Self {
        self.topology = policy;
        self
    }

    pub fn meta(mut self, meta: SkeletonMeta) -> Self {
        self.meta = meta;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn id_width_is_enforced() {
        assert_eq!(Precision::Bits8.parse_id("120"), Some(120));
        assert_eq!(Precision::Bits8.parse_id("300"), None);
        assert_eq!(Precision::Bits16.parse_id("40000"), None);
        assert_eq!(Precision::Bits64.parse_id("40000"), Some(40000));
        assert_eq!(Precision::Bits32.parse_id("1.5"), None);
    }

    #[test]
    fn floats_narrow_through_f32_below_64_bits() {
        let narrowed = Precision::Bits32.parse_float("3.141592653589793").unwrap();
        assert_eq!(narrowed, f64::from(3.141592653589793f64 as f32));

        let exact = Precision::Bits64.parse_float("3.141592653589793").unwrap();
        assert_eq!(exact, 3.141592653589793);
    }

    #[test]
    fn auto_parallel_respects_threshold() {
        assert_eq!(Parallel::Auto.workers_for(10), None);
        assert!(Parallel::Auto.workers_for(PARALLEL_THRESHOLD + 1).is_some());
        assert_eq!(Parallel::Workers(4).workers_for(1), Some(4));
        assert_eq!(Parallel::Off.workers_for(10_000), None);
    }
}
