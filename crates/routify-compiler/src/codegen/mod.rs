//! TypeScript + Express backend generation.
//!
//! Every artifact is derived from the same resolved routes and model list, so
//! the OpenAPI schemas, TypeScript interfaces and table/collection definitions
//! always enumerate the same field names:
//! - Scaffolding (package.json, tsconfig, README, entry point)
//! - Models (interfaces, Mongoose schemas)
//! - Data access (Knex client + schema bootstrap, repositories)
//! - Routes (Express routers with the middleware chain)
//! - Runtime modules (auth, validation, errors, filters)

pub mod naming;
pub mod project;
mod database;
mod models;
mod repositories;
mod routes;
mod runtime;

use std::collections::{HashMap, HashSet};

use crate::diagnostic::{CompileWarning, CompilerError};
use crate::ir::{AuthScheme, DataModel, Project, ResolvedRoute};
use crate::openapi::OpenApiDocument;
use naming::{to_identifier, to_pascal_case, to_snake_case};

/// Header written at the top of every generated source file.
pub const GENERATED_HEADER: &str = "// Generated by Routify. Changes will be overwritten on the next export.\n";

/// Generated project files.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedCode {
    /// (relative path, content) pairs in emission order.
    pub files: Vec<(String, String)>,
}

impl GeneratedCode {
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, content)| content.as_str())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(name, _)| name.as_str())
    }

    fn push(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.push((path.into(), content.into()));
    }
}

/// Names derived from a model and used across generated files.
#[derive(Debug, Clone)]
pub(crate) struct ModelNaming {
    /// camelCase identifier, e.g. `orderItem`.
    pub ident: String,
    /// TypeScript interface name, e.g. `OrderItem`.
    pub type_name: String,
    /// File stem and table/collection name, e.g. `order_item`.
    pub stem: String,
    /// Repository binding, e.g. `orderItemRepository`.
    pub repository: String,
}

impl ModelNaming {
    pub fn of(model: &DataModel) -> Self {
        let ident = to_identifier(&model.name);
        Self {
            type_name: to_pascal_case(&ident),
            stem: to_snake_case(&ident),
            repository: format!("{}Repository", ident),
            ident,
        }
    }

    fn with_suffix(&self, n: usize) -> Self {
        let ident = format!("{}{}", self.ident, n);
        Self {
            type_name: format!("{}{}", self.type_name, n),
            stem: format!("{}_{}", self.stem, n),
            repository: format!("{}Repository", ident),
            ident,
        }
    }

    /// Names that must be unique across models. File systems may fold case.
    fn keys(&self) -> [String; 3] {
        [
            format!("ident:{}", self.ident.to_lowercase()),
            format!("type:{}", self.type_name.to_lowercase()),
            format!("stem:{}", self.stem.to_lowercase()),
        ]
    }
}

/// A model paired with the names its artifacts use.
#[derive(Debug, Clone)]
pub(crate) struct NamedModel<'a> {
    pub model: &'a DataModel,
    pub naming: ModelNaming,
}

#[cfg(test)]
impl<'a> NamedModel<'a> {
    pub fn new(model: &'a DataModel) -> Self {
        Self {
            model,
            naming: ModelNaming::of(model),
        }
    }
}

/// Assigns every model a distinct set of generated names.
///
/// Distinct model names can normalize to the same identifier (`OrderItem`
/// and `order_item`). A later model that clashes with an earlier one gets a
/// numeric suffix (`OrderItem2`, `order_item_2`) and a warning.
pub(crate) fn name_models<'a>(
    models: &[&'a DataModel],
    warnings: &mut Vec<CompileWarning>,
) -> Vec<NamedModel<'a>> {
    let mut taken: HashMap<String, &str> = HashMap::new();
    let mut named = Vec::with_capacity(models.len());

    for &model in models {
        let base = ModelNaming::of(model);
        let mut naming = base.clone();
        let mut other = None;
        let mut suffix = 1;
        while let Some(owner) = clash(&taken, &naming) {
            other.get_or_insert(owner);
            suffix += 1;
            naming = base.with_suffix(suffix);
        }
        if let Some(other) = other {
            warnings.push(CompileWarning::ModelNameCollision {
                model: model.name.clone(),
                other: other.to_string(),
                renamed: naming.type_name.clone(),
            });
        }

        for key in naming.keys() {
            taken.insert(key, model.name.as_str());
        }
        named.push(NamedModel { model, naming });
    }
    named
}

/// Model already holding one of `naming`'s names, if any.
fn clash<'a>(taken: &HashMap<String, &'a str>, naming: &ModelNaming) -> Option<&'a str> {
    naming.keys().into_iter().find_map(|key| taken.get(&key).copied())
}

/// Models that get generated artifacts: named, first declaration wins.
pub(crate) fn emitted_models(project: &Project) -> Vec<&DataModel> {
    let mut seen = HashSet::new();
    project
        .models
        .iter()
        .filter(|m| !m.name.trim().is_empty() && seen.insert(m.name.as_str()))
        .collect()
}

/// Auth schemes used by at least one route, in first-use order.
pub(crate) fn auth_schemes_in_use(routes: &[ResolvedRoute]) -> Vec<AuthScheme> {
    let mut schemes = Vec::new();
    for route in routes.iter().filter(|r| r.requires_auth) {
        let scheme = effective_scheme(route.auth_scheme);
        if !schemes.contains(&scheme) {
            schemes.push(scheme);
        }
    }
    schemes
}

/// Auth is required but no scheme was chosen: fall back to bearer JWT,
/// which is what the OpenAPI security scheme advertises.
pub(crate) fn effective_scheme(scheme: AuthScheme) -> AuthScheme {
    match scheme {
        AuthScheme::None => AuthScheme::Jwt,
        other => other,
    }
}

/// Generates the backend project for `routes`.
///
/// Returns the file set plus warnings for route details that could not be
/// honoured (unknown fields, missing models).
pub fn generate(
    project: &Project,
    routes: &[ResolvedRoute],
    document: &OpenApiDocument,
) -> Result<(GeneratedCode, Vec<CompileWarning>), CompilerError> {
    let mut code = GeneratedCode::default();
    let mut warnings = Vec::new();
    let engine = project.settings.database;

    // Scaffolding
    code.push("package.json", project::generate_package_json(project, routes)?);
    code.push("tsconfig.json", project::generate_tsconfig(project.settings.target));
    code.push(".env.example", project::generate_env_example(project, routes));
    code.push(".gitignore", project::generate_gitignore());
    code.push("README.md", project::generate_readme(project, routes));
    code.push("openapi.json", document.to_json_pretty()?);
    code.push("src/index.ts", project::generate_index_ts(project));
    code.push("src/swagger.ts", project::generate_swagger_ts(document)?);

    // Models and data access
    let named = name_models(&emitted_models(project), &mut warnings);
    code.push("src/types/models.ts", models::generate_interfaces(&named));
    code.push("src/db/client.ts", database::generate_client(project));
    if engine.is_sql() {
        code.push("src/db/schema.ts", database::generate_schema(&named, engine));
    } else {
        for model in &named {
            code.push(
                format!("src/models/{}.model.ts", model.naming.stem),
                models::generate_mongoose_model(model),
            );
        }
    }
    for model in &named {
        code.push(
            format!("src/repositories/{}.repository.ts", model.naming.stem),
            repositories::generate_repository(model, engine),
        );
    }

    // Routes
    for (path, content) in routes::generate_routes(project, routes, &named, &mut warnings) {
        code.push(path, content);
    }

    // Include runtime modules (auth, validation, errors, filters)
    let needs = runtime::RuntimeNeeds {
        auth: routes.iter().any(|r| r.requires_auth),
        rate_limit: routes.iter().any(|r| r.rate_limit.is_some()),
    };
    for (filename, content) in runtime::get_runtime_modules(engine, needs) {
        code.push(filename, content);
    }

    tracing::debug!(files = code.files.len(), "generated backend project");
    Ok((code, warnings))
}
