//! Model checks: names, primary keys and the settings of database nodes.

use std::collections::HashSet;

use crate::diagnostic::CompileWarning;
use crate::ir::{NodeData, Project};

/// Checks the model list and every database node's model reference.
pub fn check_models(project: &Project, warnings: &mut Vec<CompileWarning>) {
    let mut names = HashSet::new();

    for (index, model) in project.models.iter().enumerate() {
        if model.name.trim().is_empty() {
            warnings.push(CompileWarning::UnnamedModel { index });
            continue;
        }
        if !names.insert(model.name.as_str()) {
            warnings.push(CompileWarning::DuplicateModel {
                model: model.name.clone(),
            });
            continue;
        }

        let key = model.primary_key();
        match key.len() {
            0 => warnings.push(CompileWarning::MissingPrimaryKey {
                model: model.name.clone(),
            }),
            1 => {}
            _ => warnings.push(CompileWarning::CompositeKey {
                model: model.name.clone(),
                fields: key.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(", "),
            }),
        }
    }

    for node in &project.nodes {
        let NodeData::Database(config) = &node.data else {
            continue;
        };
        if config.model.trim().is_empty() {
            warnings.push(CompileWarning::EmptyModelName {
                node: node.id.clone(),
            });
        } else if !names.contains(config.model.as_str()) {
            warnings.push(CompileWarning::UnknownModel {
                node: node.id.clone(),
                model: config.model.clone(),
            });
        }
        if let Some(limit) = config.limit.as_ref().filter(|_| config.has_invalid_limit()) {
            warnings.push(CompileWarning::InvalidLimit {
                node: node.id.clone(),
                value: limit.to_string(),
            });
        }
    }
}
