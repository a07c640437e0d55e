//! Project data model.
//!
//! These types mirror the editor's project JSON (camelCase keys) and are what
//! every compiler stage reads. `ResolvedRoute` is the one derived type: it is
//! produced by the resolver and consumed by the OpenAPI and code generators.

mod database;
mod endpoint;
mod model;
mod route;
mod schema_field;
mod settings;

pub use database::{
    AuthConfig, ContentType, DatabaseConfig, DbOperation, FilterConfig, FilterOperator,
    FilterSource, OrderBy, ResponseConfig, SortDirection,
};
pub use endpoint::{
    AuthScheme, EndpointAuth, EndpointConfig, HttpMethod, ParamConfig, ParamType,
    RateLimitConfig, ResponseDefinition, TokenLocation,
};
pub use model::{DataModel, ModelField, ModelFieldType, Relation, RelationType};
pub use route::{DataOperation, ResolvedParam, ResolvedResponse, ResolvedRoute};
pub use schema_field::{FieldConstraints, FieldKind, SchemaField};
pub use settings::{ApiStyle, ProjectSettings, StorageEngine, Target};

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A complete project snapshot: graph, models and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u32>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub models: Vec<DataModel>,
    #[serde(default)]
    pub settings: ProjectSettings,
}

impl Project {
    /// An empty project with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            format_version: None,
            id: String::new(),
            name: name.into(),
            description: String::new(),
            created_at: None,
            updated_at: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            models: Vec::new(),
            settings: ProjectSettings::default(),
        }
    }

    /// Endpoint nodes with their configs, in node order.
    pub fn endpoints(&self) -> impl Iterator<Item = (&Node, &EndpointConfig)> {
        self.nodes.iter().filter_map(|node| match &node.data {
            NodeData::Endpoint(config) => Some((node, config)),
            _ => None,
        })
    }

    /// First model with the given name.
    pub fn model(&self, name: &str) -> Option<&DataModel> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Canvas coordinates. Cosmetic; never read by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Editor node type string; usually equal to the data kind.
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    pub data: NodeData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl Node {
    pub fn new(id: impl Into<String>, data: NodeData) -> Self {
        Self {
            id: id.into(),
            node_type: data.kind().as_str().to_string(),
            position: Position::default(),
            data,
            selected: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

/// Discriminant of [`NodeData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Endpoint,
    Database,
    Auth,
    Response,
    Unknown,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Endpoint => "endpoint",
            NodeKind::Database => "database",
            NodeKind::Auth => "auth",
            NodeKind::Response => "response",
            NodeKind::Unknown => "unknown",
        }
    }
}

/// Typed payload of a node, serialized as `{ "type": <kind>, "config": {...} }`.
///
/// Kinds outside the supported catalog are kept verbatim in `Unknown` so a
/// project can be re-exported without loss; they never take part in resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Endpoint(EndpointConfig),
    Database(DatabaseConfig),
    Auth(AuthConfig),
    Response(ResponseConfig),
    Unknown { kind: String, config: Value },
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Endpoint(_) => NodeKind::Endpoint,
            NodeData::Database(_) => NodeKind::Database,
            NodeData::Auth(_) => NodeKind::Auth,
            NodeData::Response(_) => NodeKind::Response,
            NodeData::Unknown { .. } => NodeKind::Unknown,
        }
    }

    /// The `type` string written to JSON.
    pub fn type_name(&self) -> &str {
        match self {
            NodeData::Unknown { kind, .. } => kind,
            known => known.kind().as_str(),
        }
    }
}

impl Serialize for NodeData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("NodeData", 2)?;
        state.serialize_field("type", self.type_name())?;
        match self {
            NodeData::Endpoint(config) => state.serialize_field("config", config)?,
            NodeData::Database(config) => state.serialize_field("config", config)?,
            NodeData::Auth(config) => state.serialize_field("config", config)?,
            NodeData::Response(config) => state.serialize_field("config", config)?,
            NodeData::Unknown { config, .. } => state.serialize_field("config", config)?,
        }
        state.end()
    }
}

#[derive(Deserialize)]
struct RawNodeData {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    config: Value,
}

impl<'de> Deserialize<'de> for NodeData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawNodeData::deserialize(deserializer)?;
        let config = match raw.config {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let data = match raw.kind.as_str() {
            "endpoint" => NodeData::Endpoint(serde_json::from_value(config).map_err(D::Error::custom)?),
            "database" => NodeData::Database(serde_json::from_value(config).map_err(D::Error::custom)?),
            "auth" => NodeData::Auth(serde_json::from_value(config).map_err(D::Error::custom)?),
            "response" => NodeData::Response(serde_json::from_value(config).map_err(D::Error::custom)?),
            _ => NodeData::Unknown {
                kind: raw.kind,
                config,
            },
        };
        Ok(data)
    }
}

/// A connection between two nodes. Direction is irrelevant to resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_data_known_kind() {
        let json = r#"{ "type": "database", "config": { "operation": "list", "model": "Product" } }"#;
        let data: NodeData = serde_json::from_str(json).unwrap();
        match &data {
            NodeData::Database(config) => {
                assert_eq!(config.operation, DbOperation::List);
                assert_eq!(config.model, "Product");
            }
            other => panic!("expected database node, got {:?}", other),
        }
        let out = serde_json::to_value(&data).unwrap();
        assert_eq!(out["type"], "database");
        assert_eq!(out["config"]["model"], "Product");
    }

    #[test]
    fn test_node_data_unknown_kind_is_preserved() {
        let json = r#"{ "type": "logic", "config": { "type": "condition", "conditions": [] } }"#;
        let data: NodeData = serde_json::from_str(json).unwrap();
        assert_eq!(data.kind(), NodeKind::Unknown);
        assert_eq!(data.type_name(), "logic");

        let out = serde_json::to_value(&data).unwrap();
        assert_eq!(out["config"]["type"], "condition");
    }

    #[test]
    fn test_node_data_missing_config_uses_defaults() {
        let data: NodeData = serde_json::from_str(r#"{ "type": "auth" }"#).unwrap();
        assert_eq!(data, NodeData::Auth(AuthConfig::default()));
    }

    #[test]
    fn test_endpoints_in_node_order() {
        let mut project = Project::new("Shop");
        project.nodes.push(Node::new("db", NodeData::Database(DatabaseConfig::default())));
        project.nodes.push(Node::new("b", NodeData::Endpoint(EndpointConfig::default())));
        project.nodes.push(Node::new("a", NodeData::Endpoint(EndpointConfig::default())));

        let ids: Vec<_> = project.endpoints().map(|(n, _)| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(project.node("db").map(|n| n.kind()), Some(NodeKind::Database));
    }
}
