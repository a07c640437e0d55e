//! Type mapping between model field types and every target representation.
//!
//! All functions are total: unknown field types behave like `String`.

use crate::ir::{FieldKind, ModelFieldType, ParamType, StorageEngine};

/// OpenAPI primitive type of a model field.
pub fn to_openapi_type(field_type: &ModelFieldType) -> &'static str {
    match field_type {
        ModelFieldType::String => "string",
        ModelFieldType::Int => "integer",
        ModelFieldType::Float => "number",
        ModelFieldType::Boolean => "boolean",
        ModelFieldType::DateTime => "string",
        ModelFieldType::Json => "object",
        ModelFieldType::Other(_) => "string",
    }
}

/// OpenAPI `format` of a model field, if any.
pub fn openapi_format(field_type: &ModelFieldType) -> Option<&'static str> {
    match field_type {
        ModelFieldType::DateTime => Some("date-time"),
        _ => None,
    }
}

pub fn param_openapi_type(param_type: ParamType) -> &'static str {
    param_type.as_str()
}

pub fn field_kind_openapi_type(kind: &FieldKind) -> &'static str {
    kind.as_str()
}

/// TypeScript property type. DateTime travels as an ISO string in JSON.
pub fn to_ts_type(field_type: &ModelFieldType) -> &'static str {
    match field_type {
        ModelFieldType::String => "string",
        ModelFieldType::Int => "number",
        ModelFieldType::Float => "number",
        ModelFieldType::Boolean => "boolean",
        ModelFieldType::DateTime => "string",
        ModelFieldType::Json => "unknown",
        ModelFieldType::Other(_) => "string",
    }
}

/// TypeScript type of a request schema field, recursing into children.
pub fn field_kind_ts_type(kind: &FieldKind) -> String {
    match kind {
        FieldKind::String => "string".to_string(),
        FieldKind::Number => "number".to_string(),
        FieldKind::Boolean => "boolean".to_string(),
        FieldKind::Object(children) if children.is_empty() => "Record<string, unknown>".to_string(),
        FieldKind::Array(children) if children.is_empty() => "unknown[]".to_string(),
        FieldKind::Object(children) => inline_ts_object(children),
        FieldKind::Array(children) => format!("Array<{}>", inline_ts_object(children)),
    }
}

fn inline_ts_object(children: &[crate::ir::SchemaField]) -> String {
    let fields: Vec<String> = children
        .iter()
        .map(|f| {
            let optional_marker = if f.required { "" } else { "?" };
            format!("{}{}: {}", f.name, optional_marker, field_kind_ts_type(&f.kind))
        })
        .collect();
    format!("{{ {} }}", fields.join("; "))
}

/// Knex schema builder method for a column.
pub fn knex_column(field_type: &ModelFieldType, engine: StorageEngine) -> &'static str {
    match field_type {
        ModelFieldType::String => "string",
        ModelFieldType::Int => "integer",
        ModelFieldType::Float => "double",
        ModelFieldType::Boolean => "boolean",
        ModelFieldType::DateTime => "timestamp",
        ModelFieldType::Json if engine == StorageEngine::Postgresql => "jsonb",
        ModelFieldType::Json => "json",
        ModelFieldType::Other(_) => "string",
    }
}

/// Mongoose schema type expression.
pub fn mongoose_type(field_type: &ModelFieldType) -> &'static str {
    match field_type {
        ModelFieldType::String => "String",
        ModelFieldType::Int => "Number",
        ModelFieldType::Float => "Number",
        ModelFieldType::Boolean => "Boolean",
        ModelFieldType::DateTime => "Date",
        ModelFieldType::Json => "Schema.Types.Mixed",
        ModelFieldType::Other(_) => "String",
    }
}
