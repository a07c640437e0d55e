//! OpenAPI 3.0.3 document assembly from resolved routes and models.

mod document;

pub use document::{
    json_content, Components, Info, MediaType, OpenApiDocument, Operation, Parameter,
    ParameterLocation, PathItem, RequestBody, Response, Schema, SecurityScheme, Server, Tag,
};

use std::collections::{BTreeMap, HashSet};

use indexmap::{IndexMap, IndexSet};

use crate::codegen::naming::to_pascal_case;
use crate::diagnostic::CompileWarning;
use crate::ir::{DataModel, FieldKind, ParamConfig, Project, ResolvedRoute, SchemaField};
use crate::typemap;

pub const OPENAPI_VERSION: &str = "3.0.3";
pub const BEARER_AUTH: &str = "bearerAuth";

/// Responses every operation documents, added when not declared.
const STANDARD_ERRORS: [(u16, &str); 3] = [
    (400, "Bad request"),
    (404, "Not found"),
    (500, "Internal server error"),
];

/// Builds the OpenAPI document for `routes`.
///
/// Routes are visited in order; a later route with the same path and method
/// as an earlier one is skipped with a warning.
pub fn assemble(project: &Project, routes: &[ResolvedRoute]) -> (OpenApiDocument, Vec<CompileWarning>) {
    let mut warnings = Vec::new();
    let mut paths: IndexMap<String, PathItem> = IndexMap::new();
    let mut owners: IndexMap<(String, String), String> = IndexMap::new();
    let mut operation_ids: HashSet<String> = HashSet::new();
    let mut tags: IndexSet<String> = IndexSet::new();

    for route in routes {
        let path_key = route.openapi_path();
        let method = route.http_method.lowercase().to_string();

        if let Some(first) = owners.get(&(path_key.clone(), method.clone())) {
            warnings.push(CompileWarning::DuplicateOperation {
                method: route.http_method.as_str().to_string(),
                path: path_key.clone(),
                first: first.clone(),
                duplicate: route.node_id.clone(),
            });
            continue;
        }
        owners.insert((path_key.clone(), method.clone()), route.node_id.clone());

        tags.extend(route.tags.iter().cloned());

        let operation_id = unique_operation_id(route, &mut operation_ids);
        let operation = build_operation(project, route, operation_id, &mut warnings);
        paths.entry(path_key).or_default().insert(method, operation);
    }

    let schemas = project
        .models
        .iter()
        .fold(IndexMap::new(), |mut schemas, model| {
            schemas
                .entry(model.name.clone())
                .or_insert_with(|| model_schema(model));
            schemas
        });

    let mut security_schemes = IndexMap::new();
    security_schemes.insert(BEARER_AUTH.to_string(), SecurityScheme::bearer_jwt());

    let title = if project.name.trim().is_empty() {
        "Untitled Project".to_string()
    } else {
        project.name.clone()
    };
    let description = if project.description.trim().is_empty() {
        "API generated by Routify".to_string()
    } else {
        project.description.clone()
    };

    let document = OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title,
            description,
            version: "1.0.0".to_string(),
        },
        servers: vec![
            Server {
                url: format!("http://localhost:{}", project.settings.port),
                description: "Development server".to_string(),
            },
            Server {
                url: "https://your-app.onrender.com".to_string(),
                description: "Production server".to_string(),
            },
        ],
        paths,
        components: Components {
            schemas,
            security_schemes,
        },
        tags: tags
            .into_iter()
            .map(|name| Tag {
                description: format!("{} operations", name),
                name,
            })
            .collect(),
    };

    tracing::debug!(
        operations = document.operation_count(),
        schemas = document.components.schemas.len(),
        "assembled OpenAPI document"
    );

    (document, warnings)
}

/// Component schema of a model: one property per field.
pub fn model_schema(model: &DataModel) -> Schema {
    let properties = model
        .fields
        .iter()
        .map(|field| {
            let schema = Schema {
                format: typemap::openapi_format(&field.field_type).map(str::to_string),
                ..Schema::of_type(typemap::to_openapi_type(&field.field_type))
            };
            (field.name.clone(), schema)
        })
        .collect();

    let required: Vec<String> = model
        .fields
        .iter()
        .filter(|f| f.is_required)
        .map(|f| f.name.clone())
        .collect();

    Schema {
        properties: Some(properties),
        required: (!required.is_empty()).then_some(required),
        ..Schema::of_type("object")
    }
}

/// Inline object schema of a request or response field list.
pub fn fields_schema(fields: &[SchemaField]) -> Schema {
    let properties = fields
        .iter()
        .map(|f| (f.name.clone(), field_schema(f)))
        .collect();

    let required: Vec<String> = fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.clone())
        .collect();

    Schema {
        properties: Some(properties),
        required: (!required.is_empty()).then_some(required),
        ..Schema::of_type("object")
    }
}

fn field_schema(field: &SchemaField) -> Schema {
    let mut schema = match &field.kind {
        FieldKind::Object(children) => fields_schema(children),
        FieldKind::Array(children) if children.is_empty() => Schema::array(Schema::default()),
        FieldKind::Array(children) => Schema::array(fields_schema(children)),
        scalar => Schema::of_type(typemap::field_kind_openapi_type(scalar)),
    };

    if !field.description.is_empty() {
        schema.description = Some(field.description.clone());
    }
    let c = &field.constraints;
    schema.example = c.example.clone().filter(|e| !e.is_empty());
    schema.enum_values = c.enum_values.clone().filter(|v| !v.is_empty());
    schema.min_length = c.min_length;
    schema.max_length = c.max_length;
    schema.minimum = c.minimum;
    schema.maximum = c.maximum;
    schema.pattern = c.pattern.clone().filter(|p| !p.is_empty());
    schema
}

fn build_operation(
    project: &Project,
    route: &ResolvedRoute,
    operation_id: String,
    warnings: &mut Vec<CompileWarning>,
) -> Operation {
    let summary = if !route.summary.is_empty() {
        route.summary.clone()
    } else if !route.description.is_empty() {
        route.description.clone()
    } else {
        format!("{} {}", route.http_method.as_str(), route.path_template)
    };

    let parameters = route
        .path_params
        .iter()
        .map(|p| parameter(&p.param, ParameterLocation::Path))
        .chain(
            route
                .query_params
                .iter()
                .map(|p| parameter(p, ParameterLocation::Query)),
        )
        .collect();

    let security = route.requires_auth.then(|| {
        let mut requirement = IndexMap::new();
        requirement.insert(BEARER_AUTH.to_string(), Vec::new());
        vec![requirement]
    });

    Operation {
        summary,
        description: route.description.clone(),
        operation_id,
        tags: route.tags.clone(),
        deprecated: route.deprecated,
        parameters,
        request_body: request_body(project, route, warnings),
        responses: responses(project, route, warnings),
        security,
    }
}

fn parameter(param: &ParamConfig, location: ParameterLocation) -> Parameter {
    Parameter {
        name: param.name.clone(),
        location,
        // Path parameters are always required in OpenAPI.
        required: location == ParameterLocation::Path || param.required,
        description: param.description.clone(),
        schema: Schema {
            enum_values: param.enum_values.clone().filter(|v| !v.is_empty()),
            ..Schema::of_type(typemap::param_openapi_type(param.param_type))
        },
        example: param.example.clone().filter(|e| !e.is_empty()),
    }
}

fn request_body(
    project: &Project,
    route: &ResolvedRoute,
    warnings: &mut Vec<CompileWarning>,
) -> Option<RequestBody> {
    if !route.http_method.has_body() {
        return None;
    }

    let schema = match &route.request_body_model {
        Some(model) if project.model(model).is_some() => Schema::reference(model),
        _ if !route.body_schema.is_empty() => fields_schema(&route.body_schema),
        Some(model) => {
            warn_unknown_model(route, model, warnings);
            Schema::of_type("object")
        }
        None => return None,
    };

    Some(RequestBody {
        required: true,
        content: json_content(schema),
    })
}

fn responses(
    project: &Project,
    route: &ResolvedRoute,
    warnings: &mut Vec<CompileWarning>,
) -> IndexMap<String, Response> {
    let mut by_code: BTreeMap<u16, Response> = BTreeMap::new();

    for resolved in &route.responses {
        let description = if resolved.description.is_empty() {
            "Response".to_string()
        } else {
            resolved.description.clone()
        };

        let schema = match &resolved.model_name {
            Some(model) => {
                let item = if project.model(model).is_some() {
                    Schema::reference(model)
                } else {
                    warn_unknown_model(route, model, warnings);
                    Schema::of_type("object")
                };
                Some(if resolved.is_collection {
                    Schema::array(item)
                } else {
                    item
                })
            }
            None if !resolved.schema.is_empty() => Some(fields_schema(&resolved.schema)),
            None => None,
        };

        by_code.insert(
            resolved.status_code,
            Response {
                description,
                content: schema.map(json_content),
            },
        );
    }

    for (code, description) in STANDARD_ERRORS {
        by_code.entry(code).or_insert_with(|| Response {
            description: description.to_string(),
            content: None,
        });
    }

    by_code
        .into_iter()
        .map(|(code, response)| (code.to_string(), response))
        .collect()
}

fn warn_unknown_model(route: &ResolvedRoute, model: &str, warnings: &mut Vec<CompileWarning>) {
    let warning = CompileWarning::UnknownModel {
        node: route.node_id.clone(),
        model: model.to_string(),
    };
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}

/// camelCase of the method followed by the path words, e.g. `getApiOrdersIdStatus`.
/// Collisions get a numeric suffix.
fn unique_operation_id(route: &ResolvedRoute, taken: &mut HashSet<String>) -> String {
    let mut id = route.http_method.lowercase().to_string();
    for word in route
        .route_path
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        id.push_str(&to_pascal_case(word));
    }

    let mut candidate = id.clone();
    let mut n = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{}{}", id, n);
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{
        DatabaseConfig, DbOperation, Edge, EndpointConfig, HttpMethod, ModelField,
        ModelFieldType, Node, NodeData, ResponseDefinition,
    };
    use crate::resolve::resolve_routes;

    fn product() -> DataModel {
        DataModel::new(
            "Product",
            vec![
                ModelField::new("_id", ModelFieldType::String).id(),
                ModelField::new("price", ModelFieldType::Int).required(),
                ModelField::new("createdAt", ModelFieldType::DateTime),
            ],
        )
    }

    fn project_with(endpoint: EndpointConfig, db: Option<DatabaseConfig>) -> Project {
        let mut project = Project::new("Shop");
        project.models.push(product());
        project.nodes.push(Node::new("ep", NodeData::Endpoint(endpoint)));
        if let Some(db) = db {
            project.nodes.push(Node::new("db", NodeData::Database(db)));
            project.edges.push(Edge::new("e", "ep", "db"));
        }
        project
    }

    fn compile(project: &Project) -> (OpenApiDocument, Vec<CompileWarning>) {
        let routes = resolve_routes(project).routes;
        assemble(project, &routes)
    }

    #[test]
    fn test_model_schema() {
        let schema = serde_json::to_value(model_schema(&product())).unwrap();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["price"]["type"], "integer");
        assert_eq!(schema["properties"]["createdAt"]["format"], "date-time");
        assert_eq!(schema["required"], serde_json::json!(["_id", "price"]));
    }

    #[test]
    fn test_responses_sorted_with_standard_errors() {
        let endpoint = EndpointConfig {
            method: HttpMethod::Post,
            path: "/api/products".to_string(),
            responses: vec![ResponseDefinition::new(403), ResponseDefinition::new(201)],
            ..EndpointConfig::default()
        };
        let db = DatabaseConfig {
            operation: DbOperation::Create,
            model: "Product".to_string(),
            ..DatabaseConfig::default()
        };
        let (doc, warnings) = compile(&project_with(endpoint, Some(db)));
        assert!(warnings.is_empty());

        let op = doc.operation("/api/products", "post").unwrap();
        let codes: Vec<_> = op.responses.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["201", "400", "403", "404", "500"]);

        let created = serde_json::to_value(&op.responses["201"]).unwrap();
        assert_eq!(
            created["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Product"
        );
        let body = serde_json::to_value(op.request_body.as_ref().unwrap()).unwrap();
        assert_eq!(
            body["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Product"
        );
    }

    #[test]
    fn test_missing_model_degrades_to_object() {
        let endpoint = EndpointConfig {
            path: "/api/ghosts".to_string(),
            ..EndpointConfig::default()
        };
        let db = DatabaseConfig {
            operation: DbOperation::List,
            model: "Ghost".to_string(),
            ..DatabaseConfig::default()
        };
        let (doc, warnings) = compile(&project_with(endpoint, Some(db)));

        let op = doc.operation("/api/ghosts", "get").unwrap();
        let ok = serde_json::to_value(&op.responses["200"]).unwrap();
        let schema = &ok["content"]["application/json"]["schema"];
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["type"], "object");
        assert_eq!(
            warnings,
            vec![CompileWarning::UnknownModel {
                node: "ep".to_string(),
                model: "Ghost".to_string(),
            }]
        );
    }

    #[test]
    fn test_inline_body_schema_without_database() {
        let endpoint = EndpointConfig {
            method: HttpMethod::Post,
            path: "/api/contact".to_string(),
            body_schema: vec![
                SchemaField::new("email", FieldKind::String).required(),
                SchemaField::new(
                    "items",
                    FieldKind::Array(vec![SchemaField::new("qty", FieldKind::Number)]),
                ),
            ],
            ..EndpointConfig::default()
        };
        let (doc, _) = compile(&project_with(endpoint, None));

        let op = doc.operation("/api/contact", "post").unwrap();
        let body = serde_json::to_value(op.request_body.as_ref().unwrap()).unwrap();
        let schema = &body["content"]["application/json"]["schema"];
        assert_eq!(schema["properties"]["email"]["type"], "string");
        assert_eq!(schema["properties"]["items"]["items"]["properties"]["qty"]["type"], "number");
        assert_eq!(schema["required"], serde_json::json!(["email"]));
    }

    #[test]
    fn test_duplicate_operation_keeps_first() {
        let mut project = Project::new("Shop");
        for id in ["first", "second"] {
            let endpoint = EndpointConfig {
                path: "/api/items".to_string(),
                summary: id.to_string(),
                ..EndpointConfig::default()
            };
            project.nodes.push(Node::new(id, NodeData::Endpoint(endpoint)));
        }

        let (doc, warnings) = compile(&project);
        assert_eq!(doc.operation_count(), 1);
        assert_eq!(doc.operation("/api/items", "get").unwrap().summary, "first");
        assert!(matches!(
            &warnings[0],
            CompileWarning::DuplicateOperation { duplicate, .. } if duplicate == "second"
        ));
    }

    #[test]
    fn test_operation_ids_and_params() {
        let endpoint = EndpointConfig {
            method: HttpMethod::Patch,
            path: "/api/orders/:id/status".to_string(),
            summary: String::new(),
            ..EndpointConfig::default()
        };
        let (doc, _) = compile(&project_with(endpoint, None));

        let op = doc.operation("/api/orders/{id}/status", "patch").unwrap();
        assert_eq!(op.operation_id, "patchApiOrdersIdStatus");
        assert_eq!(op.summary, "PATCH /api/orders/:id/status");
        assert_eq!(op.parameters[0].name, "id");
        assert_eq!(op.parameters[0].location, ParameterLocation::Path);
        assert!(op.security.is_none());
        assert!(op.request_body.is_none());
    }

    #[test]
    fn test_document_header() {
        let (doc, _) = compile(&Project::new(""));
        assert_eq!(doc.openapi, "3.0.3");
        assert_eq!(doc.info.title, "Untitled Project");
        assert_eq!(doc.info.description, "API generated by Routify");
        assert_eq!(doc.servers[0].url, "http://localhost:3000");
        assert!(doc.components.security_schemes.contains_key("bearerAuth"));
        assert!(doc.tags.is_empty());
    }
}
