//! Canonicalized tree record
//!
//! A `TreeSkeleton` owns a node table whose parent links form a single
//! rooted tree, plus metadata. Construction validates the single-root
//! invariant; the table is kept sorted by node id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SkeletonError};
use crate::models::meta::SkeletonMeta;
use crate::models::node::{SkeletonNode, ROOT_SENTINEL};

/// A single neuron skeleton as a rooted, parent-pointer tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSkeleton {
    nodes: Vec<SkeletonNode>,
    meta: SkeletonMeta,
}

/// One row of an exported node table; ids are reindexed, the root parent
/// is [`ROOT_SENTINEL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: i64,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
    pub parent_id: i64,
}

/// Result of [`TreeSkeleton::export_table`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedTable {
    pub rows: Vec<TableRow>,
    /// Old node id → reindexed id.
    pub node_map: BTreeMap<i64, i64>,
}

impl TreeSkeleton {
    /// Build a skeleton from a canonicalized node table.
    ///
    /// Validates that ids are unique, that exactly one node is the root,
    /// and that every parent id exists in the table. Nodes are sorted by
    /// id.
    pub fn new(mut nodes: Vec<SkeletonNode>, meta: SkeletonMeta) -> Result<Self> {
        if nodes.is_empty() {
            return Err(SkeletonError::EmptySkeleton);
        }

        nodes.sort_by_key(|n| n.id);
        for pair in nodes.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(SkeletonError::DuplicateNode(pair[0].id));
            }
        }

        let roots = nodes.iter().filter(|n| n.is_root()).count();
        if roots != 1 {
            return Err(SkeletonError::RootCount(roots));
        }
        for node in &nodes {
            if let Some(parent) = node.parent_id {
                if nodes.binary_search_by_key(&parent, |n| n.id).is_err() {
                    return Err(SkeletonError::InvalidParent {
                        node: node.id,
                        parent,
                    });
                }
            }
        }

        Ok(Self { nodes, meta })
    }

    /// Nodes sorted by id.
    pub fn nodes(&self) -> &[SkeletonNode] {
        &self.nodes
    }

    pub fn meta(&self) -> &SkeletonMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut SkeletonMeta {
        &mut self.meta
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: i64) -> Option<&SkeletonNode> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|i| &self.nodes[i])
    }

    pub fn root_id(&self) -> i64 {
        // Invariant from `new`: exactly one root exists.
        self.nodes
            .iter()
            .find(|n| n.is_root())
            .map(|n| n.id)
            .unwrap_or(ROOT_SENTINEL)
    }

    /// Parent id of `id`, or `None` for the root or an unknown id.
    pub fn parent_of(&self, id: i64) -> Option<i64> {
        self.node(id).and_then(|n| n.parent_id)
    }

    /// Export a reindexed node table (ids `1..=n` in sorted-id order)
    /// together with the old→new id map.
    pub fn export_table(&self) -> ExportedTable {
        let node_map: BTreeMap<i64, i64> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, i as i64 + 1))
            .collect();

        let rows = self
            .nodes
            .iter()
            .map(|n| TableRow {
                id: node_map[&n.id],
                label: n.label.clone(),
                x: n.x,
                y: n.y,
                z: n.z,
                radius: n.radius,
                parent_id: n.parent_id.map(|p| node_map[&p]).unwrap_or(ROOT_SENTINEL),
            })
            .collect();

        ExportedTable { rows, node_map }
    }
}
