//! Resolved routes: the normalized form every generator consumes.

use super::{
    AuthScheme, DbOperation, FilterConfig, HttpMethod, OrderBy, ParamConfig, RateLimitConfig,
    SchemaField, TokenLocation,
};
use crate::resolve::paths;

/// One HTTP operation, resolved from an endpoint node and its neighbours.
///
/// Built fresh per compilation and never mutated after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub node_id: String,
    pub http_method: HttpMethod,
    /// Path as authored, with `:name` parameters.
    pub path_template: String,
    /// Path the generated server registers, after applying the base path.
    pub route_path: String,
    pub summary: String,
    pub description: String,
    pub deprecated: bool,
    pub tags: Vec<String>,
    pub requires_auth: bool,
    pub auth_scheme: AuthScheme,
    pub auth_roles: Vec<String>,
    /// Where credentials are read from; `None` means the scheme's default.
    pub auth_token_location: Option<TokenLocation>,
    pub auth_header_name: Option<String>,
    pub path_params: Vec<ResolvedParam>,
    pub query_params: Vec<ParamConfig>,
    pub request_body_model: Option<String>,
    pub body_schema: Vec<SchemaField>,
    pub responses: Vec<ResolvedResponse>,
    pub data_operation: Option<DataOperation>,
    pub rate_limit: Option<RateLimitConfig>,
}

impl ResolvedRoute {
    /// OpenAPI path key: the route path with `:name` rewritten to `{name}`.
    pub fn openapi_path(&self) -> String {
        paths::openapi_path(&self.route_path)
    }

    /// Status code sent on success: the first declared 2xx code, else 200.
    pub fn success_status(&self) -> u16 {
        self.responses
            .iter()
            .map(|r| r.status_code)
            .find(|code| (200..300).contains(code))
            .unwrap_or(200)
    }

    /// First tag, used to group routes into router modules.
    pub fn primary_tag(&self) -> &str {
        self.tags.first().map(|t| t.as_str()).unwrap_or("default")
    }
}

/// A path parameter, either declared on the endpoint or inferred from the template.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParam {
    pub param: ParamConfig,
    /// True when the parameter came from a `:name` token and was not declared.
    pub inferred: bool,
}

/// A response after model tagging.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedResponse {
    pub status_code: u16,
    pub description: String,
    /// Whether the body is an array of `model_name`.
    pub is_collection: bool,
    pub model_name: Option<String>,
    pub schema: Vec<SchemaField>,
}

/// Data access performed by a route, copied from its database node.
#[derive(Debug, Clone, PartialEq)]
pub struct DataOperation {
    pub operation: DbOperation,
    pub model: String,
    pub filters: Vec<FilterConfig>,
    pub select: Vec<String>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<u32>,
}
