//! User-defined data models.

use serde::{Deserialize, Serialize};

/// Type of a model field.
///
/// The editor offers a closed set of six types; anything else found in a
/// project file is kept verbatim so it survives a round trip, and is treated
/// as a string by every code generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelFieldType {
    String,
    Int,
    Float,
    Boolean,
    DateTime,
    Json,
    Other(String),
}

impl ModelFieldType {
    pub fn as_str(&self) -> &str {
        match self {
            ModelFieldType::String => "String",
            ModelFieldType::Int => "Int",
            ModelFieldType::Float => "Float",
            ModelFieldType::Boolean => "Boolean",
            ModelFieldType::DateTime => "DateTime",
            ModelFieldType::Json => "Json",
            ModelFieldType::Other(name) => name,
        }
    }
}

impl From<String> for ModelFieldType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "String" => ModelFieldType::String,
            "Int" => ModelFieldType::Int,
            "Float" => ModelFieldType::Float,
            "Boolean" => ModelFieldType::Boolean,
            "DateTime" => ModelFieldType::DateTime,
            "Json" => ModelFieldType::Json,
            _ => ModelFieldType::Other(s),
        }
    }
}

impl From<ModelFieldType> for String {
    fn from(t: ModelFieldType) -> Self {
        match t {
            ModelFieldType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Cardinality of a relation between models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationType {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// A relation from one model field to a field of another model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub model: String,
    pub field: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
}

/// A single field of a data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: ModelFieldType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_id: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,
}

impl ModelField {
    pub fn new(name: impl Into<String>, field_type: ModelFieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            is_required: false,
            is_unique: false,
            is_id: false,
            default: None,
            relation: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Marks the field as (part of) the primary key. Ids are required and unique.
    pub fn id(mut self) -> Self {
        self.is_id = true;
        self.is_required = true;
        self.is_unique = true;
        self
    }
}

/// A named entity schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataModel {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<ModelField>,
}

impl DataModel {
    pub fn new(name: impl Into<String>, fields: Vec<ModelField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Fields marked `isId`, in declaration order.
    pub fn primary_key(&self) -> Vec<&ModelField> {
        self.fields.iter().filter(|f| f.is_id).collect()
    }

    /// The field used to address a single record from a `:id` path parameter.
    ///
    /// This is the first `isId` field; models without one fall back to a field
    /// literally named `id` or `_id`.
    pub fn lookup_field(&self) -> Option<&ModelField> {
        self.fields
            .iter()
            .find(|f| f.is_id)
            .or_else(|| self.fields.iter().find(|f| f.name == "id" || f.name == "_id"))
    }

    pub fn field(&self, name: &str) -> Option<&ModelField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}
