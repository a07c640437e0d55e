//! Project lint.
//!
//! Checks the graph and the model list for problems the later stages would
//! silently work around. Lint never fails: every finding is a
//! [`CompileWarning`] and compilation continues.

mod models;
mod structure;

use crate::diagnostic::CompileWarning;
use crate::ir::Project;

/// Lints the whole project.
pub fn lint(project: &Project) -> Vec<CompileWarning> {
    let mut warnings = Vec::new();

    // Validate graph structure
    structure::check_structure(project, &mut warnings);

    // Validate models and the references to them
    models::check_models(project, &mut warnings);

    tracing::debug!(warnings = warnings.len(), "lint finished");
    warnings
}
