//! HNSW search: single-layer bounded best-first search and multi-layer KNN.
//!
//! [`search_layer`] maintains two heaps keyed by distance to the query:
//! a min-heap frontier of nodes to expand and a max-heap of the best
//! `ef` results seen so far. Both orderings fall back to the node id on
//! equal distances, so identical queries traverse and return in exactly
//! the same order every time.

use crate::hnsw::distance::euclidean;
use crate::hnsw::graph::HnswGraph;
use crate::hnsw::visited::Visited;
use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;

/// Frontier entry. `BinaryHeap` is a max-heap, so the ordering is
/// reversed to pop the closest node (lowest id on ties) first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    distance: OrderedFloat<f32>,
    id: u32,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Result entry. Max-heap by distance, so the worst of the current best
/// `ef` sits on top for O(1) eviction; on equal distances the
/// later-inserted node counts as worse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResultEntry {
    distance: OrderedFloat<f32>,
    id: u32,
}

impl Ord for ResultEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for ResultEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Bounded best-first search over a single layer.
///
/// Returns up to `ef` `(distance, id)` pairs closest to `query`,
/// sorted ascending by distance then id. `visited` is reset at the
/// start of each call and must cover every node id in the graph.
pub(crate) fn search_layer(
    graph: &HnswGraph,
    query: &[f32],
    entry_points: &[u32],
    ef: usize,
    layer: usize,
    visited: &mut Visited,
) -> Vec<(f32, u32)> {
    visited.reset();
    visited.grow(graph.node_count as usize);

    let mut frontier: BinaryHeap<FrontierEntry> = BinaryHeap::with_capacity(ef * 2);
    let mut results: BinaryHeap<ResultEntry> = BinaryHeap::with_capacity(ef + 1);
    // Cached worst distance in `results`, avoiding heap peeks in the
    // hot loop. Meaningful only once `results` is full.
    let mut worst_dist = f32::MAX;

    for &ep in entry_points {
        if visited.mark(ep) {
            let dist = euclidean(query, graph.vector(ep));
            frontier.push(FrontierEntry {
                distance: OrderedFloat(dist),
                id: ep,
            });
            results.push(ResultEntry {
                distance: OrderedFloat(dist),
                id: ep,
            });
            if results.len() >= ef {
                worst_dist = results.peek().map_or(f32::MAX, |r| r.distance.0);
            }
        }
    }

    while let Some(current) = frontier.pop() {
        // The closest unexpanded candidate is farther than the worst
        // result: no neighbor can improve the result set.
        if results.len() >= ef && current.distance.0 > worst_dist {
            break;
        }

        let node = current.id as usize;
        if layer >= graph.neighbors[node].len() {
            continue;
        }
        for &neighbor in &graph.neighbors[node][layer] {
            if !visited.mark(neighbor) {
                continue;
            }
            let dist = euclidean(query, graph.vector(neighbor));
            if results.len() < ef || dist < worst_dist {
                frontier.push(FrontierEntry {
                    distance: OrderedFloat(dist),
                    id: neighbor,
                });
                results.push(ResultEntry {
                    distance: OrderedFloat(dist),
                    id: neighbor,
                });
                if results.len() > ef {
                    results.pop();
                }
                worst_dist = results.peek().map_or(f32::MAX, |r| r.distance.0);
            }
        }
    }

    results
        .into_sorted_vec()
        .into_iter()
        .map(|r| (r.distance.0, r.id))
        .collect()
}

/// Multi-layer KNN search.
///
/// Descends greedily from the entry point with `ef = 1` down to layer
/// 1, then runs a `max(k, ef_search)`-bounded search at layer 0 and
/// returns the `k` closest `(distance, id)` pairs ascending.
pub fn knn_search(graph: &HnswGraph, query: &[f32], k: usize) -> Vec<(f32, u32)> {
    let Some(entry_point) = graph.entry_point else {
        return Vec::new();
    };

    let mut visited = Visited::with_capacity(graph.node_count as usize);
    let mut ep = entry_point;
    for layer in (1..=graph.max_layer).rev() {
        let nearest = search_layer(graph, query, std::slice::from_ref(&ep), 1, layer, &mut visited);
        if let Some(&(_, id)) = nearest.first() {
            ep = id;
        }
    }

    let ef = graph.config.ef_search.max(k);
    let mut results = search_layer(graph, query, std::slice::from_ref(&ep), ef, 0, &mut visited);
    results.truncate(k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hnsw::graph::HnswConfig;

    /// Hand-build a single-layer graph from explicit adjacency.
    fn line_graph(coords: &[f32], edges: &[&[u32]]) -> HnswGraph {
        let mut g = HnswGraph::new(HnswConfig::new(4, 16));
        g.dimension = 1;
        for (i, &x) in coords.iter().enumerate() {
            g.push_node(&[x], 0, vec![edges[i].to_vec()]);
        }
        g.entry_point = Some(0);
        g
    }

    #[test]
    fn test_search_layer_single_node() {
        let g = line_graph(&[5.0], &[&[]]);
        let mut visited = Visited::with_capacity(1);
        let out = search_layer(&g, &[0.0], &[0], 4, 0, &mut visited);
        assert_eq!(out, vec![(5.0, 0)]);
    }

    #[test]
    fn test_search_layer_walks_towards_query() {
        // 0 - 1 - 2 - 3 on a line; query sits beyond node 3.
        let g = line_graph(
            &[0.0, 1.0, 2.0, 3.0],
            &[&[1], &[0, 2], &[1, 3], &[2]],
        );
        let mut visited = Visited::with_capacity(4);
        let out = search_layer(&g, &[3.2], &[0], 2, 0, &mut visited);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].1, 3);
        assert_eq!(out[1].1, 2);
    }

    #[test]
    fn test_search_layer_caps_results_at_ef() {
        let g = line_graph(
            &[0.0, 1.0, 2.0, 3.0, 4.0],
            &[&[1], &[0, 2], &[1, 3], &[2, 4], &[3]],
        );
        let mut visited = Visited::with_capacity(5);
        let out = search_layer(&g, &[0.0], &[0], 3, 0, &mut visited);
        assert_eq!(out.len(), 3);
        assert_eq!(
            out.iter().map(|&(_, id)| id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_equal_distances_order_by_id() {
        // Nodes 1 and 2 are both at distance 2 from the query at 0.
        let g = line_graph(&[0.0, 2.0, -2.0], &[&[1, 2], &[0], &[0]]);
        let mut visited = Visited::with_capacity(3);
        let out = search_layer(&g, &[0.0], &[0], 3, 0, &mut visited);
        assert_eq!(
            out.iter().map(|&(_, id)| id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_knn_search_empty_graph() {
        let g = HnswGraph::new(HnswConfig::default());
        assert!(knn_search(&g, &[1.0, 2.0], 3).is_empty());
    }

    #[test]
    fn test_knn_search_truncates_to_k() {
        let g = line_graph(
            &[0.0, 1.0, 2.0, 3.0],
            &[&[1], &[0, 2], &[1, 3], &[2]],
        );
        let out = knn_search(&g, &[1.4], 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].1, 1);
        assert_eq!(out[1].1, 2);
    }
}
