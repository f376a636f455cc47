//! Single-source, single-target Dijkstra over an undirected weighted graph.

use super::SearchMask;
use crate::projection::SectionWeight;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A found route as graph indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// Visited nodes, source first.
    pub nodes: Vec<NodeIndex>,
    /// Traversed edges; `edges[i]` joins `nodes[i]` and `nodes[i + 1]`.
    pub edges: Vec<EdgeIndex>,
    /// Accumulated distance.
    pub cost: f64,
}

#[derive(Copy, Clone, Debug)]
struct Frontier {
    cost: f64,
    seq: u64,
    node: NodeIndex,
}

// BinaryHeap is a max-heap; flip the comparison so the cheapest entry pops
// first. Equal costs pop in insertion order.
impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

/// Find the minimal-distance route from `source` to `target`.
///
/// Nodes and links hidden by `mask` are never expanded. The search stops as
/// soon as `target` is settled. Returns `None` when `target` is unreachable
/// or either endpoint is masked.
pub fn dijkstra<N>(
    graph: &UnGraph<N, SectionWeight>,
    source: NodeIndex,
    target: NodeIndex,
    mask: &SearchMask,
) -> Option<Route> {
    let n = graph.node_count();
    if source.index() >= n || target.index() >= n {
        return None;
    }
    if mask.is_node_blocked(source) || mask.is_node_blocked(target) {
        return None;
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut pred: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    dist[source.index()] = 0.0;
    heap.push(Frontier {
        cost: 0.0,
        seq,
        node: source,
    });

    while let Some(Frontier { cost, node, .. }) = heap.pop() {
        if settled[node.index()] {
            continue;
        }
        settled[node.index()] = true;

        if node == target {
            return Some(reconstruct(&pred, source, target, cost));
        }

        for edge in graph.edges(node) {
            let next = if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            };
            if next == node
                || settled[next.index()]
                || mask.is_node_blocked(next)
                || mask.is_link_blocked(node, next)
            {
                continue;
            }

            let candidate = cost + edge.weight().distance;
            if candidate < dist[next.index()] {
                dist[next.index()] = candidate;
                pred[next.index()] = Some((node, edge.id()));
                seq += 1;
                heap.push(Frontier {
                    cost: candidate,
                    seq,
                    node: next,
                });
            }
        }
    }

    None
}

/// Walk predecessor links back from `target`.
fn reconstruct(
    pred: &[Option<(NodeIndex, EdgeIndex)>],
    source: NodeIndex,
    target: NodeIndex,
    cost: f64,
) -> Route {
    let mut nodes = vec![target];
    let mut edges = Vec::new();
    let mut current = target;
    while current != source {
        match pred[current.index()] {
            Some((prev, edge)) => {
                edges.push(edge);
                nodes.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    nodes.reverse();
    edges.reverse();
    Route { nodes, edges, cost }
}

// ============================================================================
// Tests
// ============================================================================
