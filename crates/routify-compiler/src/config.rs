//! Compiler configuration.

use std::path::PathBuf;

use crate::ir::{ProjectSettings, StorageEngine};

/// Where [`Compiler::build`](crate::Compiler::build) writes the generated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// A directory tree.
    Directory(PathBuf),
    /// A zip archive whose entries live under a folder named after the project.
    Zip(PathBuf),
}

impl OutputTarget {
    /// Picks the target from a path: `*.zip` is an archive, anything else a directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if is_zip {
            OutputTarget::Zip(path)
        } else {
            OutputTarget::Directory(path)
        }
    }
}

/// Configuration for the Routify compiler.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Where generated files are written.
    pub output: OutputTarget,

    /// Overrides the project's storage engine.
    pub database: Option<StorageEngine>,

    /// Overrides the project's server port.
    pub port: Option<u16>,
}

impl CompilerConfig {
    /// Applies the overrides to a copy of `settings`.
    pub fn apply(&self, settings: &ProjectSettings) -> ProjectSettings {
        let mut settings = settings.clone();
        if let Some(database) = self.database {
            settings.database = database;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        settings
    }

    /// Whether any setting is overridden.
    pub fn has_overrides(&self) -> bool {
        self.database.is_some() || self.port.is_some()
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            output: OutputTarget::Directory(PathBuf::from("generated")),
            database: None,
            port: None,
        }
    }
}
