//! Graph structure checks.
//!
//! Validates that node ids are unique, that every edge connects two existing
//! nodes and that endpoints have something to route.

use std::collections::HashSet;

use crate::diagnostic::CompileWarning;
use crate::graph::dangling_edges;
use crate::ir::{NodeData, Project};

/// Checks nodes and edges.
pub fn check_structure(project: &Project, warnings: &mut Vec<CompileWarning>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for node in &project.nodes {
        if !seen.insert(node.id.as_str()) && reported.insert(node.id.as_str()) {
            warnings.push(CompileWarning::DuplicateNodeId { id: node.id.clone() });
        }
    }

    for node in &project.nodes {
        match &node.data {
            NodeData::Unknown { kind, .. } => warnings.push(CompileWarning::UnknownNodeKind {
                node: node.id.clone(),
                kind: kind.clone(),
            }),
            NodeData::Endpoint(config) if config.path.trim().is_empty() => {
                warnings.push(CompileWarning::EmptyPath {
                    endpoint: node.id.clone(),
                })
            }
            _ => {}
        }
    }

    for (edge, missing) in dangling_edges(&project.edges, &project.nodes) {
        warnings.push(CompileWarning::DanglingEdge {
            edge: edge.id.clone(),
            missing: missing.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Edge, EndpointConfig, Node};
    use serde_json::json;

    fn check(project: &Project) -> Vec<CompileWarning> {
        let mut warnings = Vec::new();
        check_structure(project, &mut warnings);
        warnings
    }

    #[test]
    fn test_duplicate_ids_reported_once() {
        let mut project = Project::new("P");
        for _ in 0..3 {
            project.nodes.push(Node::new("ep", NodeData::Endpoint(EndpointConfig::default())));
        }
        let warnings = check(&project);
        assert_eq!(warnings, vec![CompileWarning::DuplicateNodeId { id: "ep".to_string() }]);
    }

    #[test]
    fn test_unknown_kind_and_dangling_edge() {
        let mut project = Project::new("P");
        project.nodes.push(Node::new(
            "mw",
            NodeData::Unknown {
                kind: "middleware".to_string(),
                config: json!({}),
            },
        ));
        project.edges.push(Edge::new("e1", "mw", "gone"));

        let warnings = check(&project);
        assert!(warnings.contains(&CompileWarning::UnknownNodeKind {
            node: "mw".to_string(),
            kind: "middleware".to_string(),
        }));
        assert!(warnings.contains(&CompileWarning::DanglingEdge {
            edge: "e1".to_string(),
            missing: "gone".to_string(),
        }));
    }

    #[test]
    fn test_empty_path() {
        let mut project = Project::new("P");
        let config = EndpointConfig {
            path: "  ".to_string(),
            ..EndpointConfig::default()
        };
        project.nodes.push(Node::new("ep", NodeData::Endpoint(config)));
        assert_eq!(
            check(&project),
            vec![CompileWarning::EmptyPath { endpoint: "ep".to_string() }]
        );
    }
}
