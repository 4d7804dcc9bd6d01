//! Property tests for the canonicalization core
//!
//! Random trees are generated as parent arrays, then handed to the
//! canonicalizer as a shuffled, randomly-oriented undirected edge list.

use neuroskel_core::{canonicalize, Edge, RawNode, TopologyPolicy};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::Index;

/// Random tree over ids `1..=n`: node table order shuffled, every tree
/// edge randomly flipped, edge list shuffled.
fn skeleton_strategy() -> impl Strategy<Value = (Vec<RawNode>, Vec<Edge>)> {
    (2usize..=24)
        .prop_flat_map(|n| {
            (
                Just(n),
                vec(any::<Index>(), n - 1),
                vec(any::<bool>(), n - 1),
                Just((1..=n as i64).collect::<Vec<i64>>()).prop_shuffle(),
            )
        })
        .prop_flat_map(|(n, parents, flips, order)| {
            let nodes: Vec<RawNode> = order
                .iter()
                .map(|&id| RawNode::new(id, id as f64, -(id as f64), 0.5, 1.0))
                .collect();
            let edges: Vec<Edge> = (1..n)
                .map(|i| {
                    let parent = parents[i - 1].index(i) as i64 + 1;
                    let child = i as i64 + 1;
                    if flips[i - 1] {
                        Edge::new(child, parent)
                    } else {
                        Edge::new(parent, child)
                    }
                })
                .collect();
            (Just(nodes), Just(edges).prop_shuffle())
        })
}

proptest! {
    #[test]
    fn canonicalization_yields_single_root((nodes, edges) in skeleton_strategy()) {
        let c = canonicalize(&nodes, &edges, TopologyPolicy::Strict).unwrap();
        prop_assert_eq!(c.nodes.iter().filter(|n| n.is_root()).count(), 1);
        prop_assert_eq!(c.nodes.len(), nodes.len());
    }

    #[test]
    fn every_edge_is_realized((nodes, edges) in skeleton_strategy()) {
        let c = canonicalize(&nodes, &edges, TopologyPolicy::Strict).unwrap();
        for e in &edges {
            let realized = c.nodes.iter().any(|n| {
                (n.id == e.target && n.parent_id == Some(e.source))
                    || (n.id == e.source && n.parent_id == Some(e.target))
            });
            prop_assert!(realized, "edge ({}, {}) not realized", e.source, e.target);
        }
    }

    #[test]
    fn parent_chains_terminate_at_the_root((nodes, edges) in skeleton_strategy()) {
        let c = canonicalize(&nodes, &edges, TopologyPolicy::Strict).unwrap();
        let parent: std::collections::HashMap<i64, Option<i64>> =
            c.nodes.iter().map(|n| (n.id, n.parent_id)).collect();
        for n in &c.nodes {
            let mut cursor = n.id;
            let mut steps = 0usize;
            while let Some(Some(p)) = parent.get(&cursor) {
                cursor = *p;
                steps += 1;
                prop_assert!(steps <= c.nodes.len(), "cycle through node {}", n.id);
            }
        }
    }

    #[test]
    fn canonicalization_is_deterministic((nodes, edges) in skeleton_strategy()) {
        let a = canonicalize(&nodes, &edges, TopologyPolicy::Strict).unwrap();
        let b = canonicalize(&nodes, &edges, TopologyPolicy::Strict).unwrap();
        prop_assert_eq!(a, b);
    }
}
