//! Model interfaces and Mongoose schemas.

use crate::ir::{ModelField, ModelFieldType};
use crate::typemap;
use super::naming::{property_key, quote};
use super::{NamedModel, GENERATED_HEADER};

/// Generates `src/types/models.ts` with one interface per model.
pub(crate) fn generate_interfaces(models: &[NamedModel]) -> String {
    let mut output = String::new();
    output.push_str(GENERATED_HEADER);

    for NamedModel { model, naming } in models {
        output.push('\n');
        output.push_str(&format!("export interface {} {{\n", naming.type_name));
        for field in &model.fields {
            let optional_marker = if field.is_required { "" } else { "?" };
            output.push_str(&format!(
                "  {}{}: {};\n",
                property_key(&field.name),
                optional_marker,
                typemap::to_ts_type(&field.field_type)
            ));
        }
        output.push_str("}\n");
    }

    output
}

/// Generates `src/models/<model>.model.ts` for MongoDB projects.
pub(crate) fn generate_mongoose_model(named: &NamedModel) -> String {
    let NamedModel { model, naming } = named;
    let schema_var = format!("{}Schema", naming.ident);

    let mut output = String::new();
    output.push_str(GENERATED_HEADER);
    output.push_str("import { Schema, model } from 'mongoose';\n");
    output.push_str(&format!(
        "import type {{ {} }} from '../types/models';\n\n",
        naming.type_name
    ));

    output.push_str(&format!(
        "const {} = new Schema<{}>(\n  {{\n",
        schema_var, naming.type_name
    ));
    for field in &model.fields {
        output.push_str(&format!(
            "    {}: {},\n",
            property_key(&field.name),
            mongoose_field(field)
        ));
    }
    output.push_str(&format!(
        "  }},\n  {{ collection: {}, versionKey: false }},\n);\n\n",
        quote(&naming.stem)
    ));

    output.push_str(&format!(
        "export const {}Model = model<{}>({}, {});\n",
        naming.type_name,
        naming.type_name,
        quote(&naming.type_name),
        schema_var
    ));
    output
}

fn mongoose_field(field: &ModelField) -> String {
    let mut parts = vec![format!("type: {}", typemap::mongoose_type(&field.field_type))];
    if field.is_required {
        parts.push("required: true".to_string());
    }
    if field.is_unique && !field.is_id {
        parts.push("unique: true".to_string());
    }
    match default_literal(field) {
        Some(DefaultValue::Now) => parts.push("default: Date.now".to_string()),
        Some(DefaultValue::Literal(value)) => parts.push(format!("default: {}", value)),
        None if field.is_required && field.field_type == ModelFieldType::DateTime => {
            parts.push("default: Date.now".to_string())
        }
        None => {}
    }
    format!("{{ {} }}", parts.join(", "))
}

/// A field default rendered for generated code.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DefaultValue {
    /// Current timestamp.
    Now,
    /// A TypeScript literal.
    Literal(String),
}

/// Interprets a field's `default` string according to its type.
///
/// Numbers and booleans that do not parse fall back to string literals.
pub(crate) fn default_literal(field: &ModelField) -> Option<DefaultValue> {
    let raw = field.default.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }

    let value = match &field.field_type {
        ModelFieldType::DateTime if matches!(raw, "now" | "now()" | "NOW()") => DefaultValue::Now,
        ModelFieldType::Int if raw.parse::<i64>().is_ok() => DefaultValue::Literal(raw.to_string()),
        ModelFieldType::Float if raw.parse::<f64>().is_ok() => DefaultValue::Literal(raw.to_string()),
        ModelFieldType::Boolean if raw == "true" || raw == "false" => {
            DefaultValue::Literal(raw.to_string())
        }
        _ => DefaultValue::Literal(quote(raw)),
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::DataModel;

    fn order() -> DataModel {
        DataModel::new(
            "Order",
            vec![
                ModelField::new("_id", ModelFieldType::String).id(),
                ModelField::new("total", ModelFieldType::Int).required(),
                ModelField::new("items", ModelFieldType::Json),
                ModelField::new("createdAt", ModelFieldType::DateTime).required(),
                ModelField::new("email", ModelFieldType::String).unique(),
            ],
        )
    }

    #[test]
    fn test_interface_fields() {
        let model = order();
        let ts = generate_interfaces(&[NamedModel::new(&model)]);
        assert!(ts.contains("export interface Order {"));
        assert!(ts.contains("  _id: string;\n"));
        assert!(ts.contains("  total: number;\n"));
        assert!(ts.contains("  items?: unknown;\n"));
        assert!(ts.contains("  createdAt: string;\n"));
    }

    #[test]
    fn test_mongoose_model() {
        let model = order();
        let ts = generate_mongoose_model(&NamedModel::new(&model));
        assert!(ts.contains("const orderSchema = new Schema<Order>("));
        assert!(ts.contains("_id: { type: String, required: true },"));
        assert!(ts.contains("items: { type: Schema.Types.Mixed },"));
        assert!(ts.contains("createdAt: { type: Date, required: true, default: Date.now },"));
        assert!(ts.contains("email: { type: String, unique: true },"));
        assert!(ts.contains("export const OrderModel = model<Order>('Order', orderSchema);"));
    }

    #[test]
    fn test_default_literals() {
        let mut field = ModelField::new("stock", ModelFieldType::Int);
        field.default = Some("0".to_string());
        assert_eq!(default_literal(&field), Some(DefaultValue::Literal("0".to_string())));

        field.default = Some("many".to_string());
        assert_eq!(default_literal(&field), Some(DefaultValue::Literal("'many'".to_string())));

        let mut created = ModelField::new("createdAt", ModelFieldType::DateTime);
        created.default = Some("now()".to_string());
        assert_eq!(default_literal(&created), Some(DefaultValue::Now));
    }
}
