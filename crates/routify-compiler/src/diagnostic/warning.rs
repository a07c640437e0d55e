//! Non-fatal compilation diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// A problem in the project graph that the compiler worked around.
///
/// Warnings never stop a compilation; the affected route or model degrades
/// to the closest sensible output.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    // =========================================================================
    // Graph
    // =========================================================================
    #[error("Edge '{edge}' references missing node '{missing}'")]
    #[diagnostic(code(routify::graph::dangling_edge), severity(Warning))]
    DanglingEdge {
        edge: String,
        missing: String,
    },

    #[error("Duplicate node id '{id}'")]
    #[diagnostic(
        code(routify::graph::duplicate_node),
        severity(Warning),
        help("Edges to this id connect to every node that shares it")
    )]
    DuplicateNodeId {
        id: String,
    },

    #[error("Node '{node}' has unsupported kind '{kind}' and is ignored")]
    #[diagnostic(code(routify::graph::unknown_node_kind), severity(Warning))]
    UnknownNodeKind {
        node: String,
        kind: String,
    },

    #[error("Endpoint '{endpoint}' is connected to {count} database nodes; using '{chosen}'")]
    #[diagnostic(
        code(routify::graph::multiple_database_nodes),
        severity(Warning),
        help("The first database node in project order wins")
    )]
    MultipleDatabaseNodes {
        endpoint: String,
        chosen: String,
        count: usize,
    },

    // =========================================================================
    // Models
    // =========================================================================
    #[error("Model '{model}' referenced by node '{node}' does not exist")]
    #[diagnostic(
        code(routify::model::unknown),
        severity(Warning),
        help("Create the model in the schema panel or fix the name on the database node")
    )]
    UnknownModel {
        node: String,
        model: String,
    },

    #[error("Model '{model}' has no primary key field")]
    #[diagnostic(
        code(routify::model::missing_primary_key),
        severity(Warning),
        help("Mark one field with isId")
    )]
    MissingPrimaryKey {
        model: String,
    },

    #[error("Model '{model}' has a composite primary key ({fields}); only the first field is used for lookups")]
    #[diagnostic(code(routify::model::composite_key), severity(Warning))]
    CompositeKey {
        model: String,
        fields: String,
    },

    #[error("Model name '{model}' is declared more than once")]
    #[diagnostic(code(routify::model::duplicate), severity(Warning))]
    DuplicateModel {
        model: String,
    },

    #[error("Model '{model}' generates the same names as '{other}'; its artifacts use '{renamed}'")]
    #[diagnostic(
        code(routify::model::name_collision),
        severity(Warning),
        help("Rename one of the models so their identifiers differ")
    )]
    ModelNameCollision {
        model: String,
        other: String,
        renamed: String,
    },

    #[error("Database node '{node}' has no model")]
    #[diagnostic(code(routify::model::empty_name), severity(Warning))]
    EmptyModelName {
        node: String,
    },

    #[error("Model #{index} has no name and is skipped")]
    #[diagnostic(code(routify::model::unnamed), severity(Warning))]
    UnnamedModel {
        index: usize,
    },

    #[error("Field '{field}' used in {usage} on '{node}' is not a field of model '{model}'")]
    #[diagnostic(code(routify::model::unknown_field), severity(Warning))]
    UnknownField {
        node: String,
        model: String,
        field: String,
        usage: String,
    },

    // =========================================================================
    // Routes
    // =========================================================================
    #[error("{method} {path} is declared by '{duplicate}' and '{first}'; keeping '{first}'")]
    #[diagnostic(code(routify::route::duplicate_operation), severity(Warning))]
    DuplicateOperation {
        method: String,
        path: String,
        first: String,
        duplicate: String,
    },

    #[error("Path parameter '{param}' of endpoint '{endpoint}' does not appear in '{path}'")]
    #[diagnostic(code(routify::route::undeclared_path_param), severity(Warning))]
    UndeclaredPathParam {
        endpoint: String,
        param: String,
        path: String,
    },

    #[error("Database node '{node}' has limit {value}, which is not a non-negative integer; no limit is applied")]
    #[diagnostic(code(routify::route::invalid_limit), severity(Warning))]
    InvalidLimit {
        node: String,
        value: String,
    },

    #[error("Endpoint '{endpoint}' has an empty path")]
    #[diagnostic(code(routify::route::empty_path), severity(Warning))]
    EmptyPath {
        endpoint: String,
    },
}
