//! Route resolution.
//!
//! Turns every endpoint node plus the database and auth nodes wired to it
//! into one [`ResolvedRoute`]. Resolution never fails: malformed endpoints
//! still produce a best-effort route and a warning.

pub mod paths;

use crate::diagnostic::CompileWarning;
use crate::graph::GraphIndex;
use crate::ir::{
    AuthConfig, AuthScheme, DataOperation, DatabaseConfig, DbOperation, EndpointConfig, Node,
    NodeData, ParamConfig, ParamType, Project, ResolvedParam, ResolvedResponse, ResolvedRoute,
    ResponseDefinition,
};

/// Routes in endpoint node order, plus everything worth warning about.
#[derive(Debug, Default)]
pub struct Resolution {
    pub routes: Vec<ResolvedRoute>,
    pub warnings: Vec<CompileWarning>,
}

/// Resolves one route per endpoint node.
pub fn resolve_routes(project: &Project) -> Resolution {
    let index = GraphIndex::build(&project.edges);
    let mut resolution = Resolution::default();

    for (node, endpoint) in project.endpoints() {
        let route = resolve_endpoint(project, &index, node, endpoint, &mut resolution.warnings);
        tracing::debug!(
            node = %node.id,
            method = route.http_method.as_str(),
            path = %route.route_path,
            "resolved route"
        );
        resolution.routes.push(route);
    }

    resolution
}

fn resolve_endpoint(
    project: &Project,
    index: &GraphIndex,
    node: &Node,
    endpoint: &EndpointConfig,
    warnings: &mut Vec<CompileWarning>,
) -> ResolvedRoute {
    let connected = index.connected_nodes_of(&node.id, &project.nodes);

    let databases: Vec<(&Node, &DatabaseConfig)> = connected
        .iter()
        .filter_map(|n| match &n.data {
            NodeData::Database(config) => Some((*n, config)),
            _ => None,
        })
        .collect();
    let auth_node: Option<&AuthConfig> = connected.iter().find_map(|n| match &n.data {
        NodeData::Auth(config) => Some(config),
        _ => None,
    });

    let db = databases.first().map(|(db_node, config)| {
        if databases.len() > 1 {
            warnings.push(CompileWarning::MultipleDatabaseNodes {
                endpoint: node.id.clone(),
                chosen: db_node.id.clone(),
                count: databases.len(),
            });
        }
        *config
    });

    if endpoint.path.trim().is_empty() {
        warnings.push(CompileWarning::EmptyPath {
            endpoint: node.id.clone(),
        });
    }

    // Auth
    let requires_auth = endpoint.auth.required || auth_node.is_some();
    let (auth_scheme, auth_roles, auth_token_location, auth_header_name) = if endpoint.auth.required {
        (
            endpoint.auth.scheme,
            endpoint.auth.roles.clone(),
            endpoint.auth.token_location,
            endpoint.auth.header_name.clone(),
        )
    } else if let Some(auth) = auth_node {
        (
            auth.scheme,
            auth.roles().to_vec(),
            auth.token_location,
            auth.header_name.clone(),
        )
    } else {
        (AuthScheme::None, Vec::new(), None, None)
    };

    let path_params = resolve_path_params(node, endpoint, warnings);

    // Responses, tagged with the model of the data operation
    let model = db.map(|d| d.model.as_str()).filter(|m| !m.is_empty());
    let is_collection = db.map(|d| d.operation == DbOperation::List).unwrap_or(false);

    let declared: Vec<ResponseDefinition> = if endpoint.responses.is_empty() {
        vec![ResponseDefinition::ok()]
    } else {
        endpoint.responses.clone()
    };

    let responses = declared
        .into_iter()
        .map(|r| {
            let tagged = model.filter(|_| r.is_success());
            ResolvedResponse {
                status_code: r.status_code,
                description: r.description,
                is_collection: tagged.is_some() && is_collection,
                model_name: tagged.map(str::to_string),
                schema: r.schema,
            }
        })
        .collect();

    let tags = if endpoint.tags.is_empty() {
        vec![paths::tag_from_path(&endpoint.path)]
    } else {
        endpoint.tags.clone()
    };

    let request_body_model = model
        .filter(|_| endpoint.method.has_body())
        .map(str::to_string);

    let data_operation = db.map(|d| DataOperation {
        operation: d.operation,
        model: d.model.clone(),
        filters: d.filters.clone(),
        select: d.select.clone(),
        order_by: d.order_by.clone(),
        limit: d.record_limit(),
    });

    ResolvedRoute {
        node_id: node.id.clone(),
        http_method: endpoint.method,
        path_template: endpoint.path.clone(),
        route_path: paths::route_path(&endpoint.path, &project.settings.base_path),
        summary: endpoint.summary.clone(),
        description: endpoint.description.clone(),
        deprecated: endpoint.deprecated,
        tags,
        requires_auth,
        auth_scheme,
        auth_roles,
        auth_token_location,
        auth_header_name,
        path_params,
        query_params: endpoint.query_params.clone(),
        request_body_model,
        body_schema: endpoint.body_schema.clone(),
        responses,
        data_operation,
        rate_limit: endpoint.rate_limit.clone().filter(|r| r.enabled),
    }
}

/// Declared path params first, then template tokens nobody declared.
///
/// Declared params absent from the template are warned about and dropped.
fn resolve_path_params(
    node: &Node,
    endpoint: &EndpointConfig,
    warnings: &mut Vec<CompileWarning>,
) -> Vec<ResolvedParam> {
    let tokens = paths::template_params(&endpoint.path);

    let mut params: Vec<ResolvedParam> = Vec::new();
    for declared in &endpoint.path_params {
        if !tokens.contains(&declared.name) {
            warnings.push(CompileWarning::UndeclaredPathParam {
                endpoint: node.id.clone(),
                param: declared.name.clone(),
                path: endpoint.path.clone(),
            });
            continue;
        }
        params.push(ResolvedParam {
            param: declared.clone(),
            inferred: false,
        });
    }

    for token in tokens {
        if endpoint.path_params.iter().any(|p| p.name == token) {
            continue;
        }
        params.push(ResolvedParam {
            param: ParamConfig {
                description: format!("{} parameter", token),
                name: token,
                param_type: ParamType::String,
                required: true,
                example: None,
                enum_values: None,
            },
            inferred: true,
        });
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Edge, EndpointAuth, HttpMethod};

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

    #[test]
    fn test_list_endpoint_tags_collection() {
        let mut project = Project::new("Shop");
        project.nodes.push(Node::new("ep", NodeData::Endpoint(endpoint(HttpMethod::Get, "/api/products"))));
        project.nodes.push(Node::new("db", NodeData::Database(database(DbOperation::List, "Product"))));
        project.edges.push(Edge::new("e", "ep", "db"));

        let resolution = resolve_routes(&project);
        let route = &resolution.routes[0];
        assert_eq!(route.route_path, "/api/products");
        assert_eq!(route.responses[0].model_name.as_deref(), Some("Product"));
        assert!(route.responses[0].is_collection);
        assert!(route.request_body_model.is_none());
        assert_eq!(route.tags, vec!["products"]);
    }

    #[test]
    fn test_error_responses_are_not_tagged() {
        let mut config = endpoint(HttpMethod::Post, "/api/products");
        config.responses = vec![ResponseDefinition::new(201), ResponseDefinition::new(403)];

        let mut project = Project::new("Shop");
        project.nodes.push(Node::new("ep", NodeData::Endpoint(config)));
        project.nodes.push(Node::new("db", NodeData::Database(database(DbOperation::Create, "Product"))));
        project.edges.push(Edge::new("e", "db", "ep"));

        let route = &resolve_routes(&project).routes[0];
        assert_eq!(route.responses[0].model_name.as_deref(), Some("Product"));
        assert!(!route.responses[0].is_collection);
        assert_eq!(route.responses[1].model_name, None);
        assert_eq!(route.request_body_model.as_deref(), Some("Product"));
    }

    #[test]
    fn test_empty_responses_synthesize_default() {
        let mut config = endpoint(HttpMethod::Get, "/api/health");
        config.responses.clear();

        let mut project = Project::new("Shop");
        project.nodes.push(Node::new("ep", NodeData::Endpoint(config)));

        let route = &resolve_routes(&project).routes[0];
        assert_eq!(route.responses.len(), 1);
        assert_eq!(route.responses[0].status_code, 200);
        assert_eq!(route.responses[0].description, "Successful response");
        assert!(route.data_operation.is_none());
    }

    #[test]
    fn test_inferred_path_param() {
        let mut project = Project::new("Shop");
        project.nodes.push(Node::new("ep", NodeData::Endpoint(endpoint(HttpMethod::Get, "/api/orders/:id"))));

        let route = &resolve_routes(&project).routes[0];
        assert_eq!(route.path_params.len(), 1);
        let param = &route.path_params[0];
        assert!(param.inferred);
        assert_eq!(param.param.name, "id");
        assert!(param.param.required);
        assert_eq!(param.param.description, "id parameter");
    }

    #[test]
    fn test_declared_param_missing_from_template_warns() {
        let mut config = endpoint(HttpMethod::Get, "/api/orders");
        config.path_params.push(ParamConfig {
            name: "id".to_string(),
            required: true,
            ..ParamConfig::default()
        });

        let mut project = Project::new("Shop");
        project.nodes.push(Node::new("ep", NodeData::Endpoint(config)));

        let resolution = resolve_routes(&project);
        assert!(resolution.routes[0].path_params.is_empty());
        assert!(matches!(
            resolution.warnings[0],
            CompileWarning::UndeclaredPathParam { .. }
        ));
    }

    #[test]
    fn test_auth_node_implies_auth() {
        let mut project = Project::new("Shop");
        project.nodes.push(Node::new("ep", NodeData::Endpoint(endpoint(HttpMethod::Get, "/api/me"))));
        project.nodes.push(Node::new(
            "auth",
            NodeData::Auth(AuthConfig {
                roles: Some(vec!["admin".to_string()]),
                ..AuthConfig::default()
            }),
        ));
        project.edges.push(Edge::new("e", "auth", "ep"));

        let route = &resolve_routes(&project).routes[0];
        assert!(route.requires_auth);
        assert_eq!(route.auth_scheme, AuthScheme::Jwt);
        assert_eq!(route.auth_roles, vec!["admin"]);
    }

    #[test]
    fn test_endpoint_auth_takes_precedence() {
        let mut config = endpoint(HttpMethod::Get, "/api/me");
        config.auth = EndpointAuth {
            scheme: AuthScheme::ApiKey,
            ..EndpointAuth::jwt(&["customer"])
        };

        let mut project = Project::new("Shop");
        project.nodes.push(Node::new("ep", NodeData::Endpoint(config)));
        project.nodes.push(Node::new("auth", NodeData::Auth(AuthConfig::default())));
        project.edges.push(Edge::new("e", "ep", "auth"));

        let route = &resolve_routes(&project).routes[0];
        assert_eq!(route.auth_scheme, AuthScheme::ApiKey);
        assert_eq!(route.auth_roles, vec!["customer"]);
    }

    #[test]
    fn test_first_database_in_node_order_wins() {
        let mut project = Project::new("Shop");
        project.nodes.push(Node::new("ep", NodeData::Endpoint(endpoint(HttpMethod::Get, "/api/things"))));
        project.nodes.push(Node::new("db-b", NodeData::Database(database(DbOperation::List, "B"))));
        project.nodes.push(Node::new("db-a", NodeData::Database(database(DbOperation::Read, "A"))));
        project.edges.push(Edge::new("e1", "ep", "db-a"));
        project.edges.push(Edge::new("e2", "ep", "db-b"));

        let resolution = resolve_routes(&project);
        assert_eq!(resolution.routes[0].responses[0].model_name.as_deref(), Some("B"));
        assert!(resolution.warnings.contains(&CompileWarning::MultipleDatabaseNodes {
            endpoint: "ep".to_string(),
            chosen: "db-b".to_string(),
            count: 2,
        }));

        project.nodes.swap(1, 2);
        let resolution = resolve_routes(&project);
        assert_eq!(resolution.routes[0].responses[0].model_name.as_deref(), Some("A"));
    }
}
