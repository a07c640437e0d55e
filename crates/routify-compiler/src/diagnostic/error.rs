//! Compiler error types.

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Hard failures. Only loading a project and writing output can fail;
/// everything the graph itself gets wrong is reported as a [`CompileWarning`].
///
/// [`CompileWarning`]: super::CompileWarning
#[derive(Error, Diagnostic, Debug)]
pub enum CompilerError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("I/O error on '{}': {message}", path.display())]
    #[diagnostic(code(routify::io::failed))]
    IoError {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Import Errors
    // =========================================================================
    #[error("Failed to import project: {message}")]
    #[diagnostic(
        code(routify::import::invalid_project),
        help("Make sure the file is a project exported from the Routify editor")
    )]
    ImportFailed {
        message: String,
    },

    #[error("Project format version {found} is newer than the supported version {supported}")]
    #[diagnostic(
        code(routify::import::unsupported_version),
        help("Upgrade routify to open this project")
    )]
    UnsupportedFormatVersion {
        found: u32,
        supported: u32,
    },

    // =========================================================================
    // Output Errors
    // =========================================================================
    #[error("Failed to write archive '{}': {message}", path.display())]
    #[diagnostic(code(routify::output::archive_failed))]
    ArchiveFailed {
        path: PathBuf,
        message: String,
    },

    #[error("Failed to serialize {what}: {message}")]
    #[diagnostic(code(routify::output::serialize_failed))]
    SerializeFailed {
        what: String,
        message: String,
    },
}

impl CompilerError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }
}
