//! HNSW insertion.
//!
//! A new node is wired into the layered graph in three phases: greedy
//! entry-point refinement from the top layer down to the node's level,
//! per-layer candidate search with diversity-aware neighbor selection,
//! and reciprocal linking with over-degree pruning. The entry-point
//! descent is always gated on the graph's maximum layer, so no layer is
//! ever skipped when the new node lands below the top.

use crate::hnsw::distance::euclidean;
use crate::hnsw::graph::HnswGraph;
use crate::hnsw::search::search_layer;
use crate::hnsw::visited::Visited;
use ordered_float::OrderedFloat;
use std::cell::RefCell;
use std::collections::HashSet;

thread_local! {
    /// Reusable visited set for insert operations, grown to the index
    /// size on demand. Eliminates per-insert allocation.
    static INSERT_VISITED: RefCell<Visited> = RefCell::new(Visited::new());
}

impl HnswGraph {
    /// Insert a vector at the given top level. Returns the new node's id.
    ///
    /// The caller samples `level` (see [`HnswGraph::random_level`]) and
    /// guarantees `vector.len()` equals the graph dimension once the
    /// graph is non-empty. The first insert establishes the dimension
    /// and the entry point.
    pub fn insert(&mut self, vector: &[f32], level: usize) -> u32 {
        let new_id = self.node_count;

        let Some(entry_point) = self.entry_point else {
            self.dimension = vector.len();
            self.push_node(vector, level, vec![Vec::new(); level + 1]);
            self.entry_point = Some(new_id);
            self.max_layer = level;
            return new_id;
        };

        let top = level.min(self.max_layer);

        let node_neighbors = INSERT_VISITED.with(|cell| {
            let mut visited = cell.borrow_mut();

            // Phase 1: refine the entry point down to level + 1. This
            // range is empty when the new node reaches the top layer.
            let mut ep = entry_point;
            for layer in (level + 1..=self.max_layer).rev() {
                let nearest =
                    search_layer(self, vector, std::slice::from_ref(&ep), 1, layer, &mut visited);
                if let Some(&(_, id)) = nearest.first() {
                    ep = id;
                }
            }

            // Phase 2: collect the new node's neighbors per layer,
            // warm-starting each lower layer from the closest candidate
            // found above it.
            let mut node_neighbors: Vec<Vec<u32>> = vec![Vec::new(); level + 1];
            for layer in (0..=top).rev() {
                let candidates = search_layer(
                    self,
                    vector,
                    std::slice::from_ref(&ep),
                    self.config.ef_construction,
                    layer,
                    &mut visited,
                );
                let selected = select_neighbors(self, &candidates, self.config.m);
                node_neighbors[layer] = selected.into_iter().map(|(_, id)| id).collect();
                if let Some(&(_, closest)) = candidates.first() {
                    ep = closest;
                }
            }
            node_neighbors
        });

        self.push_node(vector, level, node_neighbors);

        // Phase 3: reciprocal edges, pruning any list pushed past its cap.
        for layer in 0..=top {
            let m_max = self.m_max(layer);
            let selected = self.neighbors[new_id as usize][layer].clone();
            for &neighbor in &selected {
                debug_assert!(self.level(neighbor) >= layer);
                self.neighbors[neighbor as usize][layer].push(new_id);
                if self.neighbors[neighbor as usize][layer].len() > m_max {
                    self.prune_neighbors(neighbor, layer, m_max);
                }
            }
        }

        if level > self.max_layer {
            self.max_layer = level;
            self.entry_point = Some(new_id);
            tracing::debug!(node = new_id, level, "entry point promoted");
        }

        new_id
    }

    /// Cut `node`'s layer-`layer` list back to its `m_max` closest
    /// neighbors, removing the reciprocal edge of every dropped node so
    /// edges stay bidirectional.
    fn prune_neighbors(&mut self, node: u32, layer: usize, m_max: usize) {
        let mut scored: Vec<(f32, u32)> = self.neighbors[node as usize][layer]
            .iter()
            .map(|&id| (euclidean(self.vector(node), self.vector(id)), id))
            .collect();
        scored.sort_unstable_by_key(|&(dist, id)| (OrderedFloat(dist), id));

        let dropped: Vec<u32> = scored.split_off(m_max).into_iter().map(|(_, id)| id).collect();
        self.neighbors[node as usize][layer] = scored.into_iter().map(|(_, id)| id).collect();
        for d in dropped {
            self.neighbors[d as usize][layer].retain(|&id| id != node);
        }
    }
}

/// Diversity-aware neighbor selection.
///
/// Walks the candidates closest-first and keeps one only if it is
/// closer to the new vector than to every neighbor already kept, which
/// spreads edges across directions instead of clustering them. Any
/// slots left over are filled with the closest unused candidates.
/// Returns at most `m` entries; deterministic for identical inputs.
fn select_neighbors(graph: &HnswGraph, candidates: &[(f32, u32)], m: usize) -> Vec<(f32, u32)> {
    let mut sorted = candidates.to_vec();
    sorted.sort_unstable_by_key(|&(dist, id)| (OrderedFloat(dist), id));

    let mut selected: Vec<(f32, u32)> = Vec::with_capacity(m);
    for &(dist, candidate) in &sorted {
        if selected.len() >= m {
            break;
        }
        let diverse = selected.iter().all(|&(_, kept)| {
            dist <= euclidean(graph.vector(candidate), graph.vector(kept))
        });
        if diverse {
            selected.push((dist, candidate));
        }
    }

    if selected.len() < m {
        let kept: HashSet<u32> = selected.iter().map(|&(_, id)| id).collect();
        for &(dist, candidate) in &sorted {
            if selected.len() >= m {
                break;
            }
            if !kept.contains(&candidate) {
                selected.push((dist, candidate));
            }
        }
    }

    selected
}
