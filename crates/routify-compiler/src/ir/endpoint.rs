//! Endpoint node configuration.
//!
//! Endpoints are the roots of resolution: every endpoint node becomes exactly
//! one HTTP operation in the generated backend.

use serde::{Deserialize, Serialize};

use super::SchemaField;

/// HTTP methods supported by endpoint nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Upper-case method name (e.g. `GET`).
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Lower-case method name, as used for OpenAPI keys and Express router calls.
    pub fn lowercase(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// Authentication scheme, shared by inline endpoint auth and auth nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthScheme {
    #[default]
    None,
    Jwt,
    ApiKey,
    Basic,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::None => "none",
            AuthScheme::Jwt => "jwt",
            AuthScheme::ApiKey => "apiKey",
            AuthScheme::Basic => "basic",
        }
    }
}

/// Where a credential is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenLocation {
    Header,
    Cookie,
    Query,
}

impl TokenLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenLocation::Header => "header",
            TokenLocation::Cookie => "cookie",
            TokenLocation::Query => "query",
        }
    }
}

/// Auth requirement embedded in an endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointAuth {
    pub required: bool,
    #[serde(rename = "type")]
    pub scheme: AuthScheme,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_location: Option<TokenLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
}

impl EndpointAuth {
    /// No authentication; credentials read from the `Authorization` header if enabled later.
    pub fn none() -> Self {
        Self {
            required: false,
            scheme: AuthScheme::None,
            roles: Vec::new(),
            token_location: Some(TokenLocation::Header),
            header_name: Some("Authorization".to_string()),
        }
    }

    /// A required JWT check restricted to `roles` (empty means any authenticated user).
    pub fn jwt(roles: &[&str]) -> Self {
        Self {
            required: true,
            scheme: AuthScheme::Jwt,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            token_location: Some(TokenLocation::Header),
            header_name: Some("Authorization".to_string()),
        }
    }
}

/// Primitive type of a path or query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Number,
    Boolean,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }
}

/// A path or query parameter declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParamConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// A declared response of an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDefinition {
    #[serde(default = "default_status_code")]
    pub status_code: u16,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schema: Vec<SchemaField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

fn default_status_code() -> u16 {
    200
}

impl ResponseDefinition {
    /// A response with the editor's default description for `status_code`.
    pub fn new(status_code: u16) -> Self {
        let description = if status_code == 200 {
            "Successful response"
        } else {
            "Error response"
        };
        Self {
            status_code,
            description: description.to_string(),
            schema: Vec::new(),
            example: None,
        }
    }

    /// The default `200 Successful response`.
    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Per-endpoint rate limiting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests: u32,
    /// Window length in milliseconds.
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests: 100,
            window_ms: 60_000,
        }
    }
}

/// Configuration of an endpoint node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointConfig {
    pub method: HttpMethod,
    pub path: String,

    // Documentation
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    pub deprecated: bool,

    pub auth: EndpointAuth,

    pub path_params: Vec<ParamConfig>,
    pub query_params: Vec<ParamConfig>,
    pub body_schema: Vec<SchemaField>,

    pub responses: Vec<ResponseDefinition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            path: "/api/resource".to_string(),
            summary: "Get resource".to_string(),
            description: String::new(),
            tags: Vec::new(),
            deprecated: false,
            auth: EndpointAuth::none(),
            path_params: Vec::new(),
            query_params: Vec::new(),
            body_schema: Vec::new(),
            responses: vec![ResponseDefinition::ok()],
            rate_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_serialization() {
        assert_eq!(serde_json::to_string(&HttpMethod::Patch).unwrap(), "\"PATCH\"");
        let m: HttpMethod = serde_json::from_str("\"DELETE\"").unwrap();
        assert_eq!(m, HttpMethod::Delete);
        assert!(HttpMethod::Put.has_body());
        assert!(!HttpMethod::Get.has_body());
    }

    #[test]
    fn test_auth_scheme_names() {
        let scheme: AuthScheme = serde_json::from_str("\"apiKey\"").unwrap();
        assert_eq!(scheme, AuthScheme::ApiKey);
        assert_eq!(scheme.as_str(), "apiKey");
    }

    #[test]
    fn test_endpoint_defaults_fill_missing_fields() {
        let config: EndpointConfig =
            serde_json::from_str(r#"{ "method": "POST", "path": "/api/items" }"#).unwrap();
        assert_eq!(config.method, HttpMethod::Post);
        assert_eq!(config.responses, vec![ResponseDefinition::ok()]);
        assert!(!config.auth.required);
        assert_eq!(config.auth.scheme, AuthScheme::None);
    }
}
