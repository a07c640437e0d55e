//! # Routify Compiler
//!
//! This crate compiles a Routify project (a graph of endpoint, database,
//! auth and response nodes plus data models) into an OpenAPI 3.0.3 document
//! and a runnable TypeScript + Express backend.
//!
//! ## Architecture
//!
//! ```text
//! Project JSON
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Import    │  Legacy migration, settings defaults
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │     Lint     │  Graph and model checks (warnings)
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Resolve    │  Endpoint + neighbours → ResolvedRoute
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   OpenAPI    │  Routes + models → document
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  Express project files
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use routify_compiler::{Compiler, CompilerConfig, OutputTarget, Project};
//!
//! let project = Project::demo()?;
//! let compiler = Compiler::new(CompilerConfig {
//!     output: OutputTarget::Zip("shop.zip".into()),
//!     ..CompilerConfig::default()
//! });
//! let result = compiler.build(&project)?;
//! println!("{} routes, {} files", result.routes, result.files);
//! ```

pub mod archive;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod graph;
pub mod ir;
pub mod openapi;
pub mod project;
pub mod resolve;
pub mod typemap;
pub mod validate;

use std::borrow::Cow;

pub use codegen::GeneratedCode;
pub use config::{CompilerConfig, OutputTarget};
pub use diagnostic::{CompileWarning, CompilerError};
pub use ir::{Project, ResolvedRoute};
pub use openapi::OpenApiDocument;

/// The main compiler struct that orchestrates the compilation pipeline.
pub struct Compiler {
    config: CompilerConfig,
}

/// Everything one compilation produces, kept in memory.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub routes: Vec<ResolvedRoute>,
    pub document: OpenApiDocument,
    pub files: GeneratedCode,
    /// Deduplicated, in the order they were found.
    pub warnings: Vec<CompileWarning>,
}

impl Compiler {
    /// Creates a new compiler with the given configuration.
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles a project in memory.
    ///
    /// This runs the full pipeline:
    /// 1. Apply configured setting overrides
    /// 2. Lint the graph and the models
    /// 3. Resolve every endpoint into a route
    /// 4. Assemble the OpenAPI document
    /// 5. Generate the backend files
    ///
    /// Problems in the graph are collected as warnings; only serialization
    /// can fail.
    pub fn compile(&self, project: &Project) -> Result<CompileOutput, CompilerError> {
        // Phase 1: Overrides
        let project: Cow<Project> = if self.config.has_overrides() {
            let mut owned = project.clone();
            owned.settings = self.config.apply(&project.settings);
            Cow::Owned(owned)
        } else {
            Cow::Borrowed(project)
        };

        let mut warnings = Vec::new();

        // Phase 2: Lint
        collect(&mut warnings, validate::lint(&project));

        // Phase 3: Resolve
        let resolution = resolve::resolve_routes(&project);
        collect(&mut warnings, resolution.warnings);
        let routes = resolution.routes;
        tracing::debug!(routes = routes.len(), "resolved routes");

        // Phase 4: OpenAPI
        let (document, openapi_warnings) = openapi::assemble(&project, &routes);
        collect(&mut warnings, openapi_warnings);

        // Phase 5: Generate
        let (files, codegen_warnings) = codegen::generate(&project, &routes, &document)?;
        collect(&mut warnings, codegen_warnings);

        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        Ok(CompileOutput {
            routes,
            document,
            files,
            warnings,
        })
    }

    /// Compiles a project and writes it to the configured output.
    pub fn build(&self, project: &Project) -> Result<CompileResult, CompilerError> {
        let output = self.compile(project)?;

        match &self.config.output {
            OutputTarget::Directory(dir) => archive::write_directory(dir, &output.files)?,
            OutputTarget::Zip(path) => {
                let root = codegen::project::package_name(project);
                archive::write_zip(path, &root, &output.files)?
            }
        }

        Ok(CompileResult {
            routes: output.routes.len(),
            models: codegen::emitted_models(project).len(),
            files: output.files.files.len(),
            warnings: output.warnings,
        })
    }
}

/// Appends warnings not already present.
fn collect(warnings: &mut Vec<CompileWarning>, found: Vec<CompileWarning>) {
    for warning in found {
        if !warnings.contains(&warning) {
            warnings.push(warning);
        }
    }
}

/// Result of a successful build.
#[derive(Debug)]
pub struct CompileResult {
    /// Number of routes generated.
    pub routes: usize,
    /// Number of models with generated artifacts.
    pub models: usize,
    /// Number of files written.
    pub files: usize,
    /// Warnings raised while compiling.
    pub warnings: Vec<CompileWarning>,
}
