//! Recursive request/response field trees.
//!
//! The editor stores a field as `{ name, type, children? }` where `children`
//! only makes sense for `object` and `array`. Here the kind and its children
//! are one sum type, so a scalar field can never carry children.

use serde::{Deserialize, Serialize};

/// The kind of a schema field. Composite kinds own their child fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Object(Vec<SchemaField>),
    /// Array whose items are objects made of the child fields.
    Array(Vec<SchemaField>),
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Object(_) => "object",
            FieldKind::Array(_) => "array",
        }
    }

    /// Child fields of a composite kind, empty for scalars.
    pub fn children(&self) -> &[SchemaField] {
        match self {
            FieldKind::Object(children) | FieldKind::Array(children) => children,
            _ => &[],
        }
    }
}

/// Optional validation constraints attached to a field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldConstraints {
    pub example: Option<String>,
    pub enum_values: Option<Vec<String>>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub pattern: Option<String>,
}

/// A named, possibly nested field of a request body or response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSchemaField", into = "RawSchemaField")]
pub struct SchemaField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub description: String,
    pub constraints: FieldConstraints,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: String::new(),
            constraints: FieldConstraints::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Wire shape of a schema field.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchemaField {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default = "default_kind")]
    kind: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    example: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<SchemaField>>,
}

fn default_kind() -> String {
    "string".to_string()
}

impl TryFrom<RawSchemaField> for SchemaField {
    type Error = String;

    fn try_from(raw: RawSchemaField) -> Result<Self, Self::Error> {
        let kind = match raw.kind.as_str() {
            "string" => FieldKind::String,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Boolean,
            // Composite fields saved before they had children get an empty list.
            "object" => FieldKind::Object(raw.children.unwrap_or_default()),
            "array" => FieldKind::Array(raw.children.unwrap_or_default()),
            other => {
                return Err(format!(
                    "unknown schema field type '{}' for field '{}'",
                    other, raw.name
                ))
            }
        };

        Ok(SchemaField {
            name: raw.name,
            kind,
            required: raw.required,
            description: raw.description,
            constraints: FieldConstraints {
                example: raw.example,
                enum_values: raw.enum_values,
                min_length: raw.min_length,
                max_length: raw.max_length,
                minimum: raw.minimum,
                maximum: raw.maximum,
                pattern: raw.pattern,
            },
        })
    }
}

impl From<SchemaField> for RawSchemaField {
    fn from(field: SchemaField) -> Self {
        let kind = field.kind.as_str().to_string();
        let children = match field.kind {
            FieldKind::Object(children) | FieldKind::Array(children) => Some(children),
            _ => None,
        };

        RawSchemaField {
            name: field.name,
            kind,
            required: field.required,
            description: field.description,
            example: field.constraints.example,
            enum_values: field.constraints.enum_values,
            min_length: field.constraints.min_length,
            max_length: field.constraints.max_length,
            minimum: field.constraints.minimum,
            maximum: field.constraints.maximum,
            pattern: field.constraints.pattern,
            children,
        }
    }
}
