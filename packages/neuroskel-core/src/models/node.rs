//! Node and edge models
//!
//! A skeleton is a set of nodes (3D position + radius) and, before
//! canonicalization, an unordered undirected edge list.

use serde::{Deserialize, Serialize};

/// Wire/table sentinel for "no parent": the root carries this value in
/// exchange files and exported tables.
pub const ROOT_SENTINEL: i64 = -1;

/// A node as it appears in the raw exchange data, before any parent has
/// been assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: i64,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
}

impl RawNode {
    pub fn new(id: i64, x: f64, y: f64, z: f64, radius: f64) -> Self {
        Self {
            id,
            label: None,
            x,
            y,
            z,
            radius,
        }
    }
}

/// An undirected edge between two node ids.
///
/// `source`/`target` follow the attribute names of the exchange format;
/// on input the orientation carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: i64,
    pub target: i64,
}

impl Edge {
    pub fn new(source: i64, target: i64) -> Self {
        Self { source, target }
    }
}

/// A node of a canonicalized tree: `parent_id == None` marks the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonNode {
    pub id: i64,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
    pub parent_id: Option<i64>,
}

impl SkeletonNode {
    pub fn from_raw(raw: &RawNode, parent_id: Option<i64>) -> Self {
        Self {
            id: raw.id,
            label: raw.label.clone(),
            x: raw.x,
            y: raw.y,
            z: raw.z,
            radius: raw.radius,
            parent_id,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Parent id with the root mapped to [`ROOT_SENTINEL`].
    pub fn parent_sentinel(&self) -> i64 {
        self.parent_id.unwrap_or(ROOT_SENTINEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parent_sentinel_maps_root_to_minus_one() {
        let raw = RawNode::new(7, 1.0, 2.0, 3.0, 0.5);
        let root = SkeletonNode::from_raw(&raw, None);
        let child = SkeletonNode::from_raw(&raw, Some(3));

        assert!(root.is_root());
        assert_eq!(root.parent_sentinel(), ROOT_SENTINEL);
        assert_eq!(child.parent_sentinel(), 3);
    }
}
