//! Express router generation.
//!
//! Each route becomes one `router.<method>(path, ...middleware, handler)`
//! registration. Middleware runs in a fixed order: rate limit, authentication,
//! role check, JSON body parsing, body validation. The handler calls the
//! model's repository according to the wired data operation, or answers 501
//! when there is nothing it can do.

use std::collections::HashSet;

use crate::diagnostic::CompileWarning;
use crate::ir::{
    ApiStyle, DbOperation, FieldKind, Project, ResolvedRoute, SchemaField,
    StorageEngine, TokenLocation,
};
use super::naming::{property_key, quote, to_identifier, to_kebab_case};
use super::repositories::record_key;
use super::{effective_scheme, ModelNaming, NamedModel, GENERATED_HEADER};

/// A route with its rendered handler.
struct RouteHandler<'a> {
    route: &'a ResolvedRoute,
    repository: Option<ModelNaming>,
    /// Statements inside the handler's `try` block; `None` renders a 501 stub.
    body: Option<String>,
    throws_not_found: bool,
}

/// Generates the route modules: `(path, content)` pairs under `src/routes/`.
///
/// Routes sharing a method and path keep the first registration only.
pub(crate) fn generate_routes(
    project: &Project,
    routes: &[ResolvedRoute],
    models: &[NamedModel],
    warnings: &mut Vec<CompileWarning>,
) -> Vec<(String, String)> {
    let engine = project.settings.database;

    let mut seen = HashSet::new();
    let handlers: Vec<RouteHandler> = routes
        .iter()
        .filter(|r| seen.insert((r.http_method, r.openapi_path())))
        .map(|r| plan_handler(r, models, engine, warnings))
        .collect();

    match project.settings.api_style {
        ApiStyle::Minimal => {
            let mut output = render_module("router", &handlers);
            output.push_str("\nexport default router;\n");
            vec![("src/routes/index.ts".to_string(), output)]
        }
        ApiStyle::Rest => {
            // Group by resource tag, in first-seen order
            let mut groups: Vec<(String, Vec<RouteHandler>)> = Vec::new();
            for handler in handlers {
                let stem = match to_kebab_case(handler.route.primary_tag()) {
                    s if s.is_empty() => "default".to_string(),
                    s => s,
                };
                match groups.iter_mut().find(|(s, _)| *s == stem) {
                    Some((_, group)) => group.push(handler),
                    None => groups.push((stem, vec![handler])),
                }
            }

            let mut files = Vec::new();
            let mut index = String::new();
            index.push_str(GENERATED_HEADER);
            index.push_str("import { Router } from 'express';\n");
            for (stem, _) in &groups {
                index.push_str(&format!(
                    "import {{ {} }} from './{}.routes';\n",
                    router_name(stem),
                    stem
                ));
            }
            index.push_str("\nconst router = Router();\n");
            for (stem, _) in &groups {
                index.push_str(&format!("router.use({});\n", router_name(stem)));
            }
            index.push_str("\nexport default router;\n");

            for (stem, group) in &groups {
                files.push((
                    format!("src/routes/{}.routes.ts", stem),
                    render_module(&router_name(stem), group),
                ));
            }
            files.push(("src/routes/index.ts".to_string(), index));
            files
        }
    }
}

fn router_name(stem: &str) -> String {
    format!("{}Router", to_identifier(stem))
}

/// Renders a module that declares `router` and registers `handlers` on it.
fn render_module(router: &str, handlers: &[RouteHandler]) -> String {
    let routes = || handlers.iter().map(|h| h.route);
    let needs_json = routes().any(|r| r.http_method.has_body());
    let needs_auth = routes().any(|r| r.requires_auth);
    let needs_roles = routes().any(|r| r.requires_auth && !r.auth_roles.is_empty());
    let needs_rate_limit = routes().any(|r| r.rate_limit.is_some());
    let needs_validation = routes().any(validates_body);
    let needs_http_error = handlers.iter().any(|h| h.throws_not_found);

    let mut output = String::new();
    output.push_str(GENERATED_HEADER);

    if needs_json {
        output.push_str("import { Router, json } from 'express';\n");
    } else {
        output.push_str("import { Router } from 'express';\n");
    }
    if needs_auth {
        let names = if needs_roles { "authenticate, requireRoles" } else { "authenticate" };
        output.push_str(&format!("import {{ {} }} from '../middleware/auth';\n", names));
    }
    if needs_http_error {
        output.push_str("import { HttpError } from '../middleware/errors';\n");
    }
    if needs_rate_limit {
        output.push_str("import { rateLimit } from '../middleware/rate-limit';\n");
    }
    if needs_validation {
        output.push_str("import { validateBody } from '../middleware/validate';\n");
    }
    let mut imported = HashSet::new();
    for naming in handlers.iter().filter_map(|h| h.repository.as_ref()) {
        if imported.insert(naming.stem.clone()) {
            output.push_str(&format!(
                "import {{ {} }} from '../repositories/{}.repository';\n",
                naming.repository, naming.stem
            ));
        }
    }

    output.push('\n');
    if router == "router" {
        output.push_str("const router = Router();\n");
    } else {
        output.push_str(&format!("export const {} = Router();\n", router));
    }

    for handler in handlers {
        output.push('\n');
        output.push_str(&render_route(router, handler));
    }
    output
}

fn validates_body(route: &ResolvedRoute) -> bool {
    route.http_method.has_body() && !route.body_schema.is_empty()
}

fn render_route(router: &str, handler: &RouteHandler) -> String {
    let route = handler.route;
    let mut output = String::new();

    let summary = route.summary.replace(['\n', '\r'], " ");
    if summary.trim().is_empty() {
        output.push_str(&format!("// {} {}\n", route.http_method.as_str(), route.route_path));
    } else {
        output.push_str(&format!(
            "// {} {}: {}\n",
            route.http_method.as_str(),
            route.route_path,
            summary.trim()
        ));
    }
    output.push_str(&format!("{}.{}(\n", router, route.http_method.lowercase()));
    output.push_str(&format!("  {},\n", quote(&route.route_path)));

    for middleware in middleware_chain(route) {
        output.push_str(&format!("  {},\n", middleware));
    }

    match &handler.body {
        Some(body) => {
            output.push_str("  async (req, res, next) => {\n");
            output.push_str("    try {\n");
            output.push_str(body);
            output.push_str("    } catch (err) {\n");
            output.push_str("      next(err);\n");
            output.push_str("    }\n");
            output.push_str("  },\n");
        }
        None => {
            let operation = format!("{} {}", route.http_method.as_str(), route.route_path);
            output.push_str("  (_req, res) => {\n");
            output.push_str(&format!(
                "    res.status(501).json({{ error: 'Not Implemented', operation: {} }});\n",
                quote(&operation)
            ));
            output.push_str("  },\n");
        }
    }
    output.push_str(");\n");
    output
}

fn middleware_chain(route: &ResolvedRoute) -> Vec<String> {
    let mut chain = Vec::new();

    if let Some(limit) = &route.rate_limit {
        chain.push(format!(
            "rateLimit({{ requests: {}, windowMs: {} }})",
            limit.requests, limit.window_ms
        ));
    }

    if route.requires_auth {
        let scheme = quote(effective_scheme(route.auth_scheme).as_str());
        let mut options = Vec::new();
        if let Some(location) = route.auth_token_location.filter(|l| *l != TokenLocation::Header) {
            options.push(format!("tokenLocation: {}", quote(location.as_str())));
        }
        if let Some(header) = route
            .auth_header_name
            .as_deref()
            .filter(|h| !h.is_empty() && !h.eq_ignore_ascii_case("authorization"))
        {
            options.push(format!("headerName: {}", quote(header)));
        }
        if options.is_empty() {
            chain.push(format!("authenticate({})", scheme));
        } else {
            chain.push(format!("authenticate({}, {{ {} }})", scheme, options.join(", ")));
        }

        if !route.auth_roles.is_empty() {
            let roles: Vec<String> = route.auth_roles.iter().map(|r| quote(r)).collect();
            chain.push(format!("requireRoles([{}])", roles.join(", ")));
        }
    }

    if route.http_method.has_body() {
        chain.push("json()".to_string());
    }

    if validates_body(route) {
        let specs: Vec<String> = route
            .body_schema
            .iter()
            .map(|f| format!("    {},\n", field_spec(f)))
            .collect();
        chain.push(format!("validateBody([\n{}  ])", specs.concat()));
    }

    chain
}

/// One `FieldSpec` object literal for the validation runtime.
fn field_spec(field: &SchemaField) -> String {
    let mut parts = vec![
        format!("name: {}", quote(&field.name)),
        format!("type: {}", quote(field.kind.as_str())),
    ];
    if field.required {
        parts.push("required: true".to_string());
    }

    let c = &field.constraints;
    if let Some(values) = c.enum_values.as_ref().filter(|v| !v.is_empty()) {
        let values: Vec<String> = values.iter().map(|v| quote(v)).collect();
        parts.push(format!("enum: [{}]", values.join(", ")));
    }
    if let Some(n) = c.min_length {
        parts.push(format!("minLength: {}", n));
    }
    if let Some(n) = c.max_length {
        parts.push(format!("maxLength: {}", n));
    }
    if let Some(n) = c.minimum {
        parts.push(format!("minimum: {}", n));
    }
    if let Some(n) = c.maximum {
        parts.push(format!("maximum: {}", n));
    }
    if let Some(pattern) = &c.pattern {
        parts.push(format!("pattern: {}", quote(pattern)));
    }

    if let FieldKind::Object(children) | FieldKind::Array(children) = &field.kind {
        if !children.is_empty() {
            let children: Vec<String> = children.iter().map(field_spec).collect();
            parts.push(format!("children: [{}]", children.join(", ")));
        }
    }

    format!("{{ {} }}", parts.join(", "))
}

/// `req.params.<name>`, bracketed when the name is not an identifier.
fn param_access(name: &str) -> String {
    let key = property_key(name);
    if key == name {
        format!("req.params.{}", name)
    } else {
        format!("req.params[{}]", key)
    }
}

fn plan_handler<'a>(
    route: &'a ResolvedRoute,
    models: &[NamedModel],
    engine: StorageEngine,
    warnings: &mut Vec<CompileWarning>,
) -> RouteHandler<'a> {
    let stub = RouteHandler {
        route,
        repository: None,
        body: None,
        throws_not_found: false,
    };

    let Some(op) = route.data_operation.as_ref().filter(|op| !op.model.trim().is_empty()) else {
        return stub;
    };
    let Some(NamedModel { model, naming }) = models.iter().find(|m| m.model.name == op.model) else {
        let warning = CompileWarning::UnknownModel {
            node: route.node_id.clone(),
            model: op.model.clone(),
        };
        if !warnings.contains(&warning) {
            warnings.push(warning);
        }
        return stub;
    };

    let repo = naming.repository.clone();
    let status = route.success_status();
    let not_found = quote(&format!("{} not found", model.name));
    let mut unknown_field = |field: &str, usage: &str| {
        warnings.push(CompileWarning::UnknownField {
            node: route.node_id.clone(),
            model: model.name.clone(),
            field: field.to_string(),
            usage: usage.to_string(),
        });
    };

    // Operations on a single record need a path parameter and a lookup key
    let id_expr = route
        .path_params
        .iter()
        .find(|p| p.param.name == "id")
        .or_else(|| route.path_params.last())
        .map(|p| param_access(&p.param.name));
    let addressable = id_expr.is_some() && record_key(model, engine).is_some();

    let respond = |value: &str| -> String {
        if status == 204 {
            "      res.status(204).end();\n".to_string()
        } else {
            format!("      res.status({}).json({});\n", status, value)
        }
    };

    let mut body = String::new();
    let mut throws_not_found = false;
    match op.operation {
        DbOperation::List => {
            let mut options = Vec::new();

            let filters: Vec<String> = op
                .filters
                .iter()
                .filter(|f| {
                    let known = model.has_field(&f.field);
                    if !known {
                        unknown_field(&f.field, "filter");
                    }
                    known
                })
                .map(|f| {
                    format!(
                        "{{ field: {}, operator: {}, value: {}, source: {} }}",
                        quote(&f.field),
                        quote(f.operator.as_str()),
                        quote(&f.value),
                        quote(f.source.as_str())
                    )
                })
                .collect();
            if !filters.is_empty() {
                options.push(format!("filters: [{}]", filters.join(", ")));
            }

            let select: Vec<String> = op
                .select
                .iter()
                .filter(|field| {
                    let known = model.has_field(field);
                    if !known {
                        unknown_field(field, "select");
                    }
                    known
                })
                .map(|field| quote(field))
                .collect();
            if !select.is_empty() {
                options.push(format!("select: [{}]", select.join(", ")));
            }

            if let Some(order) = &op.order_by {
                if model.has_field(&order.field) {
                    options.push(format!(
                        "orderBy: {{ field: {}, direction: {} }}",
                        quote(&order.field),
                        quote(order.direction.as_str())
                    ));
                } else {
                    unknown_field(&order.field, "orderBy");
                }
            }
            if let Some(limit) = op.limit {
                options.push(format!("limit: {}", limit));
            }

            if options.is_empty() {
                body.push_str(&format!("      const items = await {}.findMany(req);\n", repo));
            } else {
                body.push_str(&format!("      const items = await {}.findMany(req, {{\n", repo));
                for option in &options {
                    body.push_str(&format!("        {},\n", option));
                }
                body.push_str("      });\n");
            }
            body.push_str(&respond("items"));
        }
        DbOperation::Create => {
            body.push_str(&format!(
                "      const created = await {}.create(req.body ?? {{}});\n",
                repo
            ));
            body.push_str(&respond("created"));
        }
        DbOperation::Read | DbOperation::Update | DbOperation::Delete if !addressable => {
            return stub;
        }
        DbOperation::Read => {
            let id = id_expr.unwrap_or_default();
            body.push_str(&format!("      const item = await {}.findById({});\n", repo, id));
            body.push_str(&format!("      if (!item) throw new HttpError(404, {});\n", not_found));
            body.push_str(&respond("item"));
            throws_not_found = true;
        }
        DbOperation::Update => {
            let id = id_expr.unwrap_or_default();
            body.push_str(&format!(
                "      const updated = await {}.update({}, req.body ?? {{}});\n",
                repo, id
            ));
            body.push_str(&format!("      if (!updated) throw new HttpError(404, {});\n", not_found));
            body.push_str(&respond("updated"));
            throws_not_found = true;
        }
        DbOperation::Delete => {
            let id = id_expr.unwrap_or_default();
            body.push_str(&format!("      const removed = await {}.remove({});\n", repo, id));
            body.push_str(&format!("      if (!removed) throw new HttpError(404, {});\n", not_found));
            body.push_str(&respond("{ deleted: true }"));
            throws_not_found = true;
        }
    }

    RouteHandler {
        route,
        repository: Some(naming.clone()),
        body: Some(body),
        throws_not_found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{emitted_models, name_models};
    use crate::ir::{
        DataModel, DatabaseConfig, Edge, EndpointAuth, EndpointConfig, FilterConfig, FilterOperator,
        FilterSource, HttpMethod, ModelField, ModelFieldType, Node, NodeData, RateLimitConfig,
    };
    use crate::resolve::resolve_routes;

    fn shop() -> Project {
        let mut project = Project::new("Shop");
        project.models.push(DataModel::new(
            "Product",
            vec![
                ModelField::new("_id", ModelFieldType::String).id(),
                ModelField::new("name", ModelFieldType::String).required(),
                ModelField::new("category", ModelFieldType::String),
                ModelField::new("price", ModelFieldType::Int).required(),
            ],
        ));
        project
    }

    fn wire(project: &mut Project, id: &str, endpoint: EndpointConfig, db: Option<DatabaseConfig>) {
        project.nodes.push(Node::new(id, NodeData::Endpoint(endpoint)));
        if let Some(db) = db {
            let db_id = format!("db-{}", id);
            project.nodes.push(Node::new(db_id.clone(), NodeData::Database(db)));
            project.edges.push(Edge::new(format!("e-{}", id), id, db_id));
        }
    }

    fn endpoint(method: HttpMethod, path: &str) -> EndpointConfig {
        EndpointConfig {
            method,
            path: path.to_string(),
            ..EndpointConfig::default()
        }
    }

    fn database(operation: DbOperation, model: &str) -> DatabaseConfig {
        DatabaseConfig {
            operation,
            model: model.to_string(),
            ..DatabaseConfig::default()
        }
    }

    fn generate(project: &Project) -> (Vec<(String, String)>, Vec<CompileWarning>) {
        let routes = resolve_routes(project).routes;
        let mut warnings = Vec::new();
        let models = name_models(&emitted_models(project), &mut warnings);
        let files = generate_routes(project, &routes, &models, &mut warnings);
        (files, warnings)
    }

    fn file<'a>(files: &'a [(String, String)], path: &str) -> &'a str {
        files
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, content)| content.as_str())
            .unwrap_or_else(|| panic!("missing {}", path))
    }

    #[test]
    fn test_list_route_with_options() {
        let mut project = shop();
        let mut db = database(DbOperation::List, "Product");
        db.filters.push(FilterConfig {
            field: "category".to_string(),
            operator: FilterOperator::Eq,
            value: "category".to_string(),
            source: FilterSource::Query,
        });
        db.limit = Some(20.into());
        wire(&mut project, "ep", endpoint(HttpMethod::Get, "/api/products"), Some(db));

        let (files, warnings) = generate(&project);
        assert!(warnings.is_empty());
        let module = file(&files, "src/routes/products.routes.ts");
        assert!(module.contains("import { productRepository } from '../repositories/product.repository';"));
        assert!(module.contains("export const productsRouter = Router();"));
        assert!(module.contains("productsRouter.get(\n  '/api/products',\n"));
        assert!(module.contains("const items = await productRepository.findMany(req, {"));
        assert!(module.contains("filters: [{ field: 'category', operator: 'eq', value: 'category', source: 'query' }],"));
        assert!(module.contains("limit: 20,"));
        assert!(module.contains("res.status(200).json(items);"));

        let index = file(&files, "src/routes/index.ts");
        assert!(index.contains("import { productsRouter } from './products.routes';"));
        assert!(index.contains("router.use(productsRouter);"));
    }

    #[test]
    fn test_middleware_order() {
        let mut project = shop();
        let mut config = endpoint(HttpMethod::Post, "/api/products");
        config.auth = EndpointAuth::jwt(&["admin"]);
        config.rate_limit = Some(RateLimitConfig {
            enabled: true,
            requests: 10,
            window_ms: 1000,
        });
        config.body_schema = vec![SchemaField::new("name", FieldKind::String).required()];
        config.responses = vec![crate::ir::ResponseDefinition::new(201)];
        wire(&mut project, "ep", config, Some(database(DbOperation::Create, "Product")));

        let (files, _) = generate(&project);
        let module = file(&files, "src/routes/products.routes.ts");
        let order = [
            "rateLimit({ requests: 10, windowMs: 1000 })",
            "authenticate('jwt')",
            "requireRoles(['admin'])",
            "json()",
            "validateBody([",
            "async (req, res, next) => {",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|needle| module.find(needle).unwrap_or_else(|| panic!("missing {}", needle)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(module.contains("{ name: 'name', type: 'string', required: true },"));
        assert!(module.contains("res.status(201).json(created);"));
    }

    #[test]
    fn test_read_and_delete_use_path_param() {
        let mut project = shop();
        wire(&mut project, "read", endpoint(HttpMethod::Get, "/api/products/:id"), Some(database(DbOperation::Read, "Product")));
        let mut delete = endpoint(HttpMethod::Delete, "/api/products/:id");
        delete.responses = vec![crate::ir::ResponseDefinition::new(204)];
        wire(&mut project, "delete", delete, Some(database(DbOperation::Delete, "Product")));

        let (files, _) = generate(&project);
        let module = file(&files, "src/routes/products.routes.ts");
        assert!(module.contains("import { HttpError } from '../middleware/errors';"));
        assert!(module.contains("const item = await productRepository.findById(req.params.id);"));
        assert!(module.contains("if (!item) throw new HttpError(404, 'Product not found');"));
        assert!(module.contains("const removed = await productRepository.remove(req.params.id);"));
        assert!(module.contains("res.status(204).end();"));
    }

    #[test]
    fn test_unwired_endpoint_is_stubbed() {
        let mut project = shop();
        wire(&mut project, "ep", endpoint(HttpMethod::Get, "/api/health"), None);

        let (files, warnings) = generate(&project);
        assert!(warnings.is_empty());
        let module = file(&files, "src/routes/health.routes.ts");
        assert!(module.contains("res.status(501).json({ error: 'Not Implemented', operation: 'GET /api/health' });"));
        assert!(!module.contains("repository"));
    }

    #[test]
    fn test_unknown_model_and_fields_warn() {
        let mut project = shop();
        wire(&mut project, "ghost", endpoint(HttpMethod::Get, "/api/ghosts"), Some(database(DbOperation::List, "Ghost")));
        let mut db = database(DbOperation::List, "Product");
        db.select = vec!["name".to_string(), "colour".to_string()];
        wire(&mut project, "list", endpoint(HttpMethod::Get, "/api/products"), Some(db));

        let (files, warnings) = generate(&project);
        assert!(warnings.contains(&CompileWarning::UnknownModel {
            node: "ghost".to_string(),
            model: "Ghost".to_string(),
        }));
        assert!(warnings.iter().any(|w| matches!(
            w,
            CompileWarning::UnknownField { field, usage, .. } if field == "colour" && usage == "select"
        )));
        let module = file(&files, "src/routes/products.routes.ts");
        assert!(module.contains("select: ['name'],"));
        assert!(file(&files, "src/routes/ghosts.routes.ts").contains("res.status(501)"));
    }

    #[test]
    fn test_minimal_style_single_module() {
        let mut project = shop();
        project.settings.api_style = ApiStyle::Minimal;
        wire(&mut project, "a", endpoint(HttpMethod::Get, "/api/products"), Some(database(DbOperation::List, "Product")));
        wire(&mut project, "b", endpoint(HttpMethod::Get, "/api/orders"), None);

        let (files, _) = generate(&project);
        assert_eq!(files.len(), 1);
        let index = file(&files, "src/routes/index.ts");
        assert!(index.contains("const router = Router();"));
        assert!(index.contains("router.get(\n  '/api/products',"));
        assert!(index.contains("router.get(\n  '/api/orders',"));
        assert!(index.trim_end().ends_with("export default router;"));
    }

    #[test]
    fn test_duplicate_operation_registered_once() {
        let mut project = shop();
        wire(&mut project, "a", endpoint(HttpMethod::Get, "/api/products"), None);
        wire(&mut project, "b", endpoint(HttpMethod::Get, "/api/products"), None);

        let (files, _) = generate(&project);
        let module = file(&files, "src/routes/products.routes.ts");
        assert_eq!(module.matches("productsRouter.get(").count(), 1);
    }
}
