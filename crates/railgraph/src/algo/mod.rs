//! Graph search primitives that run against a projection.
//!
//! These are synchronous and operate on graph indices only. Store
//! implementations translate id-based requests into a [`SearchMask`] and
//! call into here.

mod dijkstra;

pub use dijkstra::{Route, dijkstra};

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Request
// ============================================================================

/// A single-source, single-target minimal-distance query.
///
/// Exclusions describe a temporary view of the graph; they never modify the
/// projection the query runs against.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortestPathRequest {
    /// Start point id.
    pub source: String,
    /// End point id.
    pub target: String,
    /// Points the path may not visit.
    #[serde(default)]
    pub excluded_nodes: Vec<String>,
    /// Point pairs whose connecting sections may not be used.
    #[serde(default)]
    pub excluded_links: Vec<(String, String)>,
}

impl ShortestPathRequest {
    /// Create an unrestricted request.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            excluded_nodes: Vec::new(),
            excluded_links: Vec::new(),
        }
    }

    /// Forbid visiting `id`.
    pub fn excluding_node(mut self, id: impl Into<String>) -> Self {
        self.excluded_nodes.push(id.into());
        self
    }

    /// Forbid every section between `a` and `b`.
    pub fn excluding_link(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.excluded_links.push((a.into(), b.into()));
        self
    }

    /// Whether the request carries any exclusion.
    pub fn is_masked(&self) -> bool {
        !self.excluded_nodes.is_empty() || !self.excluded_links.is_empty()
    }
}

// ============================================================================
// Mask
// ============================================================================

/// Nodes and node pairs hidden from a search.
///
/// Blocking a pair hides every parallel section between the two nodes.
#[derive(Clone, Debug, Default)]
pub struct SearchMask {
    nodes: HashSet<NodeIndex>,
    links: HashSet<(NodeIndex, NodeIndex)>,
}

impl SearchMask {
    /// An empty mask.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide a node.
    pub fn block_node(&mut self, node: NodeIndex) {
        self.nodes.insert(node);
    }

    /// Hide all sections between `a` and `b`, in either direction.
    pub fn block_link(&mut self, a: NodeIndex, b: NodeIndex) {
        self.links.insert(ordered(a, b));
    }

    /// Whether `node` is hidden.
    pub fn is_node_blocked(&self, node: NodeIndex) -> bool {
        self.nodes.contains(&node)
    }

    /// Whether sections between `a` and `b` are hidden.
    pub fn is_link_blocked(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.links.contains(&ordered(a, b))
    }

    /// Whether nothing is hidden.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

fn ordered(a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_links_are_undirected() {
        let mut mask = SearchMask::new();
        assert!(mask.is_empty());
        mask.block_link(NodeIndex::new(3), NodeIndex::new(1));
        assert!(mask.is_link_blocked(NodeIndex::new(1), NodeIndex::new(3)));
        assert!(mask.is_link_blocked(NodeIndex::new(3), NodeIndex::new(1)));
        assert!(!mask.is_link_blocked(NodeIndex::new(1), NodeIndex::new(2)));
    }

    #[test]
    fn test_mask_nodes() {
        let mut mask = SearchMask::new();
        mask.block_node(NodeIndex::new(2));
        assert!(mask.is_node_blocked(NodeIndex::new(2)));
        assert!(!mask.is_node_blocked(NodeIndex::new(0)));
        assert!(!mask.is_empty());
    }

    #[test]
    fn test_request_builders() {
        let request = ShortestPathRequest::new("A", "D");
        assert!(!request.is_masked());
        let request = request.excluding_node("B").excluding_link("C", "D");
        assert!(request.is_masked());
        assert_eq!(request.excluded_nodes, vec!["B".to_string()]);
        assert_eq!(
            request.excluded_links,
            vec![("C".to_string(), "D".to_string())]
        );
    }
}
