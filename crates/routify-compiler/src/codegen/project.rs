//! Project scaffolding generation for Node/TypeScript.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::Value;

use crate::diagnostic::CompilerError;
use crate::ir::{AuthScheme, Project, ResolvedRoute, StorageEngine, Target};
use crate::openapi::OpenApiDocument;
use super::database::{connection_env, default_connection};
use super::naming::{quote, to_kebab_case};
use super::{auth_schemes_in_use, GENERATED_HEADER};

/// npm package name derived from the project name.
pub fn package_name(project: &Project) -> String {
    let name = to_kebab_case(&project.name);
    if name.is_empty() {
        "routify-api".to_string()
    } else {
        name
    }
}

/// Generates package.json for the project.
///
/// Dependencies follow the storage engine, the auth schemes in use and the
/// swagger/cors settings.
pub fn generate_package_json(
    project: &Project,
    routes: &[ResolvedRoute],
) -> Result<String, CompilerError> {
    let settings = &project.settings;

    let mut scripts = IndexMap::new();
    scripts.insert("dev", "tsx watch src/index.ts");
    match settings.target {
        Target::Nodejs => {
            scripts.insert("build", "tsc");
            scripts.insert("start", "node dist/index.js");
        }
        Target::Typescript => {
            scripts.insert("start", "tsx src/index.ts");
        }
    }
    scripts.insert("typecheck", "tsc --noEmit");

    let mut deps = BTreeMap::new();
    let mut dev_deps = BTreeMap::new();
    deps.insert("express", "^4.19.2");
    deps.insert("dotenv", "^16.4.5");
    dev_deps.insert("typescript", "^5.5.4");
    dev_deps.insert("tsx", "^4.16.2");
    dev_deps.insert("@types/node", "^20.14.10");
    dev_deps.insert("@types/express", "^4.17.21");

    match settings.database {
        StorageEngine::Postgresql => {
            deps.insert("knex", "^3.1.0");
            deps.insert("pg", "^8.12.0");
        }
        StorageEngine::Mysql => {
            deps.insert("knex", "^3.1.0");
            deps.insert("mysql2", "^3.11.0");
        }
        StorageEngine::Sqlite => {
            deps.insert("knex", "^3.1.0");
            deps.insert("better-sqlite3", "^11.1.2");
            dev_deps.insert("@types/better-sqlite3", "^7.6.11");
        }
        StorageEngine::Mongodb => {
            deps.insert("mongoose", "^8.5.1");
        }
    }

    if settings.enable_cors {
        deps.insert("cors", "^2.8.5");
        dev_deps.insert("@types/cors", "^2.8.17");
    }
    if settings.enable_swagger {
        deps.insert("swagger-ui-express", "^5.0.1");
        dev_deps.insert("@types/swagger-ui-express", "^4.1.6");
    }
    // The auth runtime module imports jsonwebtoken for every scheme
    if routes.iter().any(|r| r.requires_auth) {
        deps.insert("jsonwebtoken", "^9.0.2");
        dev_deps.insert("@types/jsonwebtoken", "^9.0.6");
    }

    let mut package: IndexMap<&str, Value> = IndexMap::new();
    package.insert("name", Value::from(package_name(project)));
    package.insert("version", Value::from("1.0.0"));
    package.insert("private", Value::from(true));
    if !project.description.trim().is_empty() {
        package.insert("description", Value::from(project.description.trim()));
    }
    package.insert("main", Value::from("dist/index.js"));
    package.insert("scripts", to_value(&scripts)?);
    package.insert("dependencies", to_value(&deps)?);
    package.insert("devDependencies", to_value(&dev_deps)?);
    package.insert("engines", to_value(&BTreeMap::from([("node", ">=18")]))?);

    let mut json = serde_json::to_string_pretty(&package).map_err(|e| serialize_failed("package.json", e))?;
    json.push('\n');
    Ok(json)
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, CompilerError> {
    serde_json::to_value(value).map_err(|e| serialize_failed("package.json", e))
}

fn serialize_failed(what: &str, e: serde_json::Error) -> CompilerError {
    CompilerError::SerializeFailed {
        what: what.to_string(),
        message: e.to_string(),
    }
}

/// Generates tsconfig.json. The `nodejs` target also emits source maps for
/// the compiled `dist/` output.
pub fn generate_tsconfig(target: Target) -> &'static str {
    match target {
        Target::Nodejs => {
            r#"{
  "compilerOptions": {
    "target": "ES2022",
    "module": "CommonJS",
    "moduleResolution": "node",
    "rootDir": "src",
    "outDir": "dist",
    "sourceMap": true,
    "strict": true,
    "esModuleInterop": true,
    "skipLibCheck": true,
    "resolveJsonModule": true,
    "forceConsistentCasingInFileNames": true
  },
  "include": ["src/**/*"]
}
"#
        }
        Target::Typescript => {
            r#"{
  "compilerOptions": {
    "target": "ES2022",
    "module": "CommonJS",
    "moduleResolution": "node",
    "rootDir": "src",
    "outDir": "dist",
    "strict": true,
    "esModuleInterop": true,
    "skipLibCheck": true,
    "resolveJsonModule": true,
    "forceConsistentCasingInFileNames": true
  },
  "include": ["src/**/*"]
}
"#
        }
    }
}

/// Generates .env.example with the variables the generated server reads.
pub fn generate_env_example(project: &Project, routes: &[ResolvedRoute]) -> String {
    let mut output = String::new();
    output.push_str(&format!("PORT={}\n", project.settings.port));
    output.push_str(&format!(
        "{}={}\n",
        connection_env(project.settings.database),
        default_connection(project)
    ));

    for scheme in auth_schemes_in_use(routes) {
        match scheme {
            AuthScheme::Jwt => output.push_str("JWT_SECRET=change-me\n"),
            AuthScheme::ApiKey => output.push_str("# Comma separated, optionally key:role1|role2\nAPI_KEYS=\n"),
            AuthScheme::Basic => {
                output.push_str("# Comma separated user:password[:role1|role2]\nBASIC_AUTH_USERS=\n")
            }
            AuthScheme::None => {}
        }
    }
    output
}

/// Generates .gitignore for the project.
pub fn generate_gitignore() -> &'static str {
    r#"node_modules/
dist/
*.sqlite
.env
"#
}

/// Generates a README with run instructions and the endpoint table.
pub fn generate_readme(project: &Project, routes: &[ResolvedRoute]) -> String {
    let settings = &project.settings;
    let title = if project.name.trim().is_empty() {
        "Untitled Project"
    } else {
        project.name.trim()
    };

    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", title));
    if !project.description.trim().is_empty() {
        output.push_str(&format!("{}\n\n", project.description.trim()));
    }
    output.push_str(&format!(
        "Express API generated by Routify ({} storage).\n\n",
        settings.database.as_str()
    ));

    output.push_str("## Getting started\n\n```bash\nnpm install\ncp .env.example .env\nnpm run dev\n```\n\n");
    if settings.target == Target::Nodejs {
        output.push_str("Production build:\n\n```bash\nnpm run build\nnpm start\n```\n\n");
    }
    output.push_str(&format!(
        "The server listens on port {} unless `PORT` is set.\n",
        settings.port
    ));
    if settings.enable_swagger {
        output.push_str("Interactive documentation is served at `/docs`, the raw document at `/openapi.json`.\n");
    }

    output.push_str("\n## Endpoints\n\n");
    if routes.is_empty() {
        output.push_str("No endpoints yet.\n");
    } else {
        output.push_str("| Method | Path | Summary | Auth |\n");
        output.push_str("|--------|------|---------|------|\n");
        for route in routes {
            let auth = if !route.requires_auth {
                "-".to_string()
            } else if route.auth_roles.is_empty() {
                "required".to_string()
            } else {
                route.auth_roles.join(", ")
            };
            output.push_str(&format!(
                "| {} | `{}` | {} | {} |\n",
                route.http_method.as_str(),
                route.route_path,
                route.summary.replace('|', "\\|").replace('\n', " "),
                auth
            ));
        }
    }

    output.push_str("\n## Structure\n\n");
    output.push_str("- `src/index.ts` - Server entry point\n");
    output.push_str("- `src/routes/` - Express routers\n");
    output.push_str("- `src/repositories/` - Data access per model\n");
    output.push_str("- `src/middleware/` - Auth, validation and error handling\n");
    output.push_str("- `openapi.json` - API description\n");
    output
}

/// Generates src/index.ts entry point.
pub fn generate_index_ts(project: &Project) -> String {
    let settings = &project.settings;
    let mut output = String::new();
    output.push_str(GENERATED_HEADER);
    output.push_str("import 'dotenv/config';\n");
    output.push_str("import express from 'express';\n");
    if settings.enable_cors {
        output.push_str("import cors from 'cors';\n");
    }
    if settings.enable_swagger {
        output.push_str("import swaggerUi from 'swagger-ui-express';\n");
        output.push_str("import openapi from './swagger';\n");
    }
    output.push_str("import { connectDatabase } from './db/client';\n");
    if settings.database.is_sql() {
        output.push_str("import { ensureSchema } from './db/schema';\n");
    }
    output.push_str("import { errorHandler, notFoundHandler } from './middleware/errors';\n");
    output.push_str("import routes from './routes';\n\n");

    output.push_str("const app = express();\n\n");

    if settings.enable_cors {
        let origins: Vec<&str> = settings
            .cors_origins
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .collect();
        if origins.is_empty() || origins.contains(&"*") {
            output.push_str("app.use(cors());\n");
        } else {
            let origins: Vec<String> = origins.iter().map(|o| quote(o)).collect();
            output.push_str(&format!("app.use(cors({{ origin: [{}] }}));\n", origins.join(", ")));
        }
    }
    if settings.enable_swagger {
        output.push_str("app.get('/openapi.json', (_req, res) => {\n  res.json(openapi);\n});\n");
        output.push_str("app.use('/docs', swaggerUi.serve, swaggerUi.setup(openapi));\n");
    }
    output.push_str("app.use(routes);\n");
    output.push_str("app.use(notFoundHandler);\n");
    output.push_str("app.use(errorHandler);\n\n");

    output.push_str(&format!(
        "const port = Number(process.env.PORT ?? {});\n\n",
        settings.port
    ));
    output.push_str("async function main(): Promise<void> {\n");
    output.push_str("  await connectDatabase();\n");
    if settings.database.is_sql() {
        output.push_str("  await ensureSchema();\n");
    }
    output.push_str("  app.listen(port, () => {\n");
    output.push_str("    console.log(`Server listening on http://localhost:${port}`);\n");
    output.push_str("  });\n");
    output.push_str("}\n\n");
    output.push_str("main().catch((err) => {\n");
    output.push_str("  console.error(err);\n");
    output.push_str("  process.exit(1);\n");
    output.push_str("});\n");
    output
}

/// Generates src/swagger.ts, whose default export is the OpenAPI document.
///
/// The document is inlined so `dist/` does not depend on files outside `src/`.
pub fn generate_swagger_ts(document: &OpenApiDocument) -> Result<String, CompilerError> {
    let json = serde_json::to_string_pretty(document).map_err(|e| serialize_failed("OpenAPI document", e))?;
    let mut output = String::new();
    output.push_str(GENERATED_HEADER);
    output.push_str(&format!("const openapi = {};\n\nexport default openapi;\n", json));
    Ok(output)
}
