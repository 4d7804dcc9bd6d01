//! Graph→tree canonicalization
//!
//! The exchange format stores skeleton topology as an unordered,
//! undirected edge list with no explicit root and no parent/child
//! orientation. This module deterministically reconstructs a single-root,
//! parent-pointer tree from it: treat the node/edge tables as an
//! undirected graph, run a breadth-first traversal from the first node in
//! table order, and orient every traversed edge from its BFS predecessor
//! to its successor.
//!
//! Output is reproducible only under a stable input ordering of nodes and
//! edges: traversal order follows edge insertion order, so reordering
//! the input may pick a different (equally valid) orientation.

use std::collections::{HashMap, VecDeque};

use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SkeletonError};
use crate::models::{Edge, RawNode, SkeletonNode};

/// What to do when the edge set does not already describe a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyPolicy {
    /// Fail with [`SkeletonError::MalformedTopology`] on disconnected or
    /// cyclic input.
    #[default]
    Strict,

    /// Keep the spanning tree of the start node's connected component and
    /// report everything else as dropped. This replicates the lossy
    /// behavior of older importers.
    FirstComponent,
}

/// Result of [`canonicalize`].
///
/// Under [`TopologyPolicy::Strict`] the `dropped_nodes` and
/// `unrealized_edges` lists are always empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Canonicalized {
    /// Parent-annotated node table, sorted by id. Exactly one node has
    /// `parent_id == None`.
    pub nodes: Vec<SkeletonNode>,

    /// Nodes outside the start node's component (first-component policy).
    pub dropped_nodes: Vec<i64>,

    /// Input edges realized as neither `parent(v) = u` nor `parent(u) = v`
    /// (cycle back-edges, self-loops, edges between dropped nodes).
    pub unrealized_edges: Vec<Edge>,
}

/// Assign a root and parent pointers to an undirected skeleton graph.
///
/// Pure function from `(nodes, edges)` to a new, independently owned node
/// table; the inputs are not retained.
///
/// # Errors
///
/// * [`SkeletonError::EmptySkeleton`]: `nodes` is empty.
/// * [`SkeletonError::DuplicateNode`]: a node id occurs twice.
/// * [`SkeletonError::DanglingEdge`]: an edge references an id missing
///   from the node table.
/// * [`SkeletonError::MalformedTopology`]: strict policy only, the edges
///   do not form a single spanning tree over the nodes.
pub fn canonicalize(
    nodes: &[RawNode],
    edges: &[Edge],
    policy: TopologyPolicy,
) -> Result<Canonicalized> {
    if nodes.is_empty() {
        return Err(SkeletonError::EmptySkeleton);
    }

    let mut graph: UnGraph<i64, ()> = UnGraph::with_capacity(nodes.len(), edges.len());
    let mut index: HashMap<i64, NodeIndex> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        if index.contains_key(&node.id) {
            return Err(SkeletonError::DuplicateNode(node.id));
        }
        index.insert(node.id, graph.add_node(node.id));
    }
    for edge in edges {
        let source = *index
            .get(&edge.source)
            .ok_or(SkeletonError::DanglingEdge {
                source_id: edge.source,
                target: edge.target,
                unknown: edge.source,
            })?;
        let target = *index
            .get(&edge.target)
            .ok_or(SkeletonError::DanglingEdge {
                source_id: edge.source,
                target: edge.target,
                unknown: edge.target,
            })?;
        graph.add_edge(source, target, ());
    }

    // BFS from the first node in table order. The discovered predecessor
    // of each node becomes its parent; the start node has none.
    let start = index[&nodes[0].id];
    let mut parent: HashMap<i64, Option<i64>> = HashMap::with_capacity(nodes.len());
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();
    parent.insert(graph[start], None);
    queue.push_back(start);
    while let Some(u) = queue.pop_front() {
        let u_id = graph[u];
        for v in graph.neighbors(u) {
            let v_id = graph[v];
            if !parent.contains_key(&v_id) {
                parent.insert(v_id, Some(u_id));
                queue.push_back(v);
            }
        }
    }

    let dropped_nodes: Vec<i64> = nodes
        .iter()
        .map(|n| n.id)
        .filter(|id| !parent.contains_key(id))
        .collect();

    let realized = |e: &Edge| {
        matches!(parent.get(&e.target), Some(Some(p)) if *p == e.source)
            || matches!(parent.get(&e.source), Some(Some(p)) if *p == e.target)
    };
    let unrealized_edges: Vec<Edge> = edges.iter().filter(|e| !realized(e)).copied().collect();

    if policy == TopologyPolicy::Strict
        && (!dropped_nodes.is_empty() || !unrealized_edges.is_empty())
    {
        return Err(SkeletonError::MalformedTopology {
            unreached: dropped_nodes,
            unrealized: unrealized_edges,
        });
    }

    let mut out: Vec<SkeletonNode> = nodes
        .iter()
        .filter_map(|n| {
            parent
                .get(&n.id)
                .map(|p| SkeletonNode::from_raw(n, *p))
        })
        .collect();
    out.sort_by_key(|n| n.id);

    Ok(Canonicalized {
        nodes: out,
        dropped_nodes,
        unrealized_edges,
    })
}
