//! Database, auth and response node configurations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AuthScheme, SchemaField, TokenLocation};

/// Operation performed by a database node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbOperation {
    Create,
    #[default]
    Read,
    Update,
    Delete,
    List,
}

impl DbOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbOperation::Create => "create",
            DbOperation::Read => "read",
            DbOperation::Update => "update",
            DbOperation::Delete => "delete",
            DbOperation::List => "list",
        }
    }
}

/// Comparison operator of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    #[default]
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    In,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Contains => "contains",
            FilterOperator::In => "in",
        }
    }
}

/// Where a filter's value comes from at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterSource {
    #[default]
    Static,
    Query,
    Body,
    Param,
}

impl FilterSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterSource::Static => "static",
            FilterSource::Query => "query",
            FilterSource::Body => "body",
            FilterSource::Param => "param",
        }
    }
}

/// A single `field <op> value` filter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub field: String,
    pub operator: FilterOperator,
    /// Literal value for `static`, otherwise the name of the query/body/path key.
    pub value: String,
    pub source: FilterSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Configuration of a database node.
///
/// `model` is a plain name reference into the project's model list. It is not
/// checked on load; an unknown name is carried through and degrades later.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseConfig {
    pub operation: DbOperation,
    pub model: String,
    pub filters: Vec<FilterConfig>,
    pub select: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    /// Maximum number of records, as authored. See [`DatabaseConfig::record_limit`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<Value>,
}

impl DatabaseConfig {
    /// The limit as a record count.
    ///
    /// Integral numbers (or numeric strings) in `u32` range are accepted.
    /// Anything else, such as `10.5` or `-1`, is ignored.
    pub fn record_limit(&self) -> Option<u32> {
        match self.limit.as_ref()? {
            Value::Number(n) => match n.as_u64() {
                Some(whole) => u32::try_from(whole).ok(),
                None => n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(f))
                    .map(|f| f as u32),
            },
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// True when a limit was given but cannot be used.
    pub fn has_invalid_limit(&self) -> bool {
        self.limit.is_some() && self.record_limit().is_none()
    }
}

/// Configuration of an auth node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(rename = "type")]
    pub scheme: AuthScheme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_location: Option<TokenLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl AuthConfig {
    pub fn roles(&self) -> &[String] {
        self.roles.as_deref().unwrap_or_default()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            scheme: AuthScheme::Jwt,
            token_location: Some(TokenLocation::Header),
            header_name: Some("Authorization".to_string()),
            roles: Some(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Json,
    Text,
    Html,
}

/// Configuration of a response node. Carried for round trips; the compiler
/// takes responses from the endpoint's own declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseConfig {
    pub status_code: u16,
    pub content_type: ContentType,
    pub schema: Vec<SchemaField>,
    pub headers: IndexMap<String, String>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            status_code: 200,
            content_type: ContentType::Json,
            schema: Vec::new(),
            headers: IndexMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_defaults() {
        let config: DatabaseConfig = serde_json::from_str(r#"{ "operation": "list" }"#).unwrap();
        assert_eq!(config.operation, DbOperation::List);
        assert!(config.model.is_empty());
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_unusable_limits_load_and_are_ignored() {
        let parse = |json: &str| -> DatabaseConfig { serde_json::from_str(json).unwrap() };

        let whole = parse(r#"{ "operation": "list", "limit": 25 }"#);
        assert_eq!(whole.record_limit(), Some(25));
        assert!(!whole.has_invalid_limit());

        assert_eq!(parse(r#"{ "limit": 10.0 }"#).record_limit(), Some(10));
        assert_eq!(parse(r#"{ "limit": "50" }"#).record_limit(), Some(50));

        for raw in ["10.5", "-1", "5000000000", "\"many\"", "true"] {
            let config = parse(&format!(r#"{{ "operation": "list", "limit": {} }}"#, raw));
            assert_eq!(config.operation, DbOperation::List);
            assert_eq!(config.record_limit(), None, "limit {}", raw);
            assert!(config.has_invalid_limit(), "limit {}", raw);
        }

        let absent = parse(r#"{ "limit": null }"#);
        assert!(absent.limit.is_none());
        assert!(!absent.has_invalid_limit());
    }

    #[test]
    fn test_limit_round_trips_as_authored() {
        let config: DatabaseConfig = serde_json::from_str(r#"{ "limit": 10.5 }"#).unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["limit"], serde_json::json!(10.5));
    }

    #[test]
    fn test_auth_config_without_roles() {
        let config: AuthConfig = serde_json::from_str(r#"{ "type": "basic" }"#).unwrap();
        assert_eq!(config.scheme, AuthScheme::Basic);
        assert!(config.roles().is_empty());
    }
}
