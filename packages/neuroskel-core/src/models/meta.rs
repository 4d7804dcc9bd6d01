//! Skeleton metadata
//!
//! Explicit, statically-typed metadata attached to a decoded skeleton:
//! named optional fields plus one open key-value extension map. Extension
//! keys are validated at insertion so they cannot shadow the named fields.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, SkeletonError};

/// Extension keys that would collide with the named fields.
const RESERVED_KEYS: [&str; 4] = ["name", "origin", "file", "archive_id"];

/// Metadata carried by a [`TreeSkeleton`](crate::TreeSkeleton).
///
/// Readers fill `origin`, `file` and `archive_id` from provenance;
/// caller-supplied values always win over reader defaults (see
/// [`SkeletonMeta::merge`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonMeta {
    /// Display name of the skeleton.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Format the skeleton was read from (e.g. `"nml"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Source file, or archive member path for archived skeletons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Top-level path segment of the source archive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_id: Option<String>,

    /// Open extension map for caller-defined attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    extra: BTreeMap<String, Value>,
}

impl SkeletonMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Insert a caller-defined attribute. Keys matching a named field are
    /// rejected with [`SkeletonError::ReservedMetaKey`].
    pub fn set_extra(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        let key = key.into();
        if RESERVED_KEYS.contains(&key.as_str()) {
            return Err(SkeletonError::ReservedMetaKey(key));
        }
        self.extra.insert(key, value);
        Ok(())
    }

    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    /// Overlay `overrides` on top of `self`: any field set in `overrides`
    /// wins, extension maps are unioned with `overrides` taking precedence.
    pub fn merge(&self, overrides: &SkeletonMeta) -> SkeletonMeta {
        let mut extra = self.extra.clone();
        extra.extend(overrides.extra.clone());
        SkeletonMeta {
            name: overrides.name.clone().or_else(|| self.name.clone()),
            origin: overrides.origin.clone().or_else(|| self.origin.clone()),
            file: overrides.file.clone().or_else(|| self.file.clone()),
            archive_id: overrides
                .archive_id
                .clone()
                .or_else(|| self.archive_id.clone()),
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reserved_keys_are_rejected() {
        let mut meta = SkeletonMeta::new();
        assert_eq!(
            meta.set_extra("origin", json!("swc")),
            Err(SkeletonError::ReservedMetaKey("origin".to_string()))
        );
        meta.set_extra("annotator", json!("mg")).unwrap();
        assert_eq!(meta.extra()["annotator"], json!("mg"));
    }

    #[test]
    fn merge_prefers_overrides() {
        let mut defaults = SkeletonMeta::named("NML");
        defaults.origin = Some("nml".to_string());
        defaults.set_extra("scale", json!(1.0)).unwrap();

        let mut overrides = SkeletonMeta::named("my neuron");
        overrides.set_extra("scale", json!(0.5)).unwrap();

        let merged = defaults.merge(&overrides);
        assert_eq!(merged.name.as_deref(), Some("my neuron"));
        assert_eq!(merged.origin.as_deref(), Some("nml"));
        assert_eq!(merged.extra()["scale"], json!(0.5));
    }
}
