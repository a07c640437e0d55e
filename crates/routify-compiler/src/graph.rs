//! Undirected adjacency over the project graph.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::ir::{Edge, Node};

/// Neighbour sets keyed by node id, built once per compilation.
///
/// Edges are treated as undirected: an endpoint may be wired to its database
/// node in either direction on the canvas.
#[derive(Debug, Default)]
pub struct GraphIndex {
    adjacency: HashMap<String, BTreeSet<String>>,
}

impl GraphIndex {
    /// Builds the index in one pass over the edges. Duplicate edges are idempotent.
    pub fn build(edges: &[Edge]) -> Self {
        let mut adjacency: HashMap<String, BTreeSet<String>> = HashMap::new();
        for edge in edges {
            adjacency
                .entry(edge.source.clone())
                .or_default()
                .insert(edge.target.clone());
            adjacency
                .entry(edge.target.clone())
                .or_default()
                .insert(edge.source.clone());
        }
        tracing::debug!(edges = edges.len(), nodes = adjacency.len(), "built graph index");
        Self { adjacency }
    }

    /// Ids adjacent to `id`; empty for isolated or unknown nodes.
    pub fn neighbors_of(&self, id: &str) -> BTreeSet<&str> {
        self.adjacency
            .get(id)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Nodes adjacent to `id`, in the order they appear in `nodes`.
    pub fn connected_nodes_of<'a>(&self, id: &str, nodes: &'a [Node]) -> Vec<&'a Node> {
        let Some(neighbors) = self.adjacency.get(id) else {
            return Vec::new();
        };
        nodes.iter().filter(|n| neighbors.contains(&n.id)).collect()
    }
}

/// Edges with at least one endpoint that is not a node id, paired with the missing id.
pub fn dangling_edges<'a>(edges: &'a [Edge], nodes: &[Node]) -> Vec<(&'a Edge, &'a str)> {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let mut dangling = Vec::new();
    for edge in edges {
        if !ids.contains(edge.source.as_str()) {
            dangling.push((edge, edge.source.as_str()));
        } else if !ids.contains(edge.target.as_str()) {
            dangling.push((edge, edge.target.as_str()));
        }
    }
    dangling
}
