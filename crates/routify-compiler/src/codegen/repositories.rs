//! Per-model data access modules.
//!
//! Every repository exposes the same surface (`findMany`, `create`, and for
//! addressable models `findById`, `update`, `remove`) so route handlers are
//! identical across storage engines. Only the bodies differ: Knex query
//! builders for SQL engines, Mongoose model calls for MongoDB.

use crate::ir::{DataModel, ModelField, ModelFieldType, StorageEngine};
use super::naming::quote;
use super::{ModelNaming, NamedModel, GENERATED_HEADER};

/// Key used to address one record, or `None` when the model has none.
///
/// MongoDB documents always carry `_id`, so Mongo repositories fall back to it.
pub(crate) fn record_key(model: &DataModel, engine: StorageEngine) -> Option<RecordKey> {
    match model.lookup_field() {
        Some(field) => Some(RecordKey::from_field(field)),
        None if engine == StorageEngine::Mongodb => Some(RecordKey {
            name: "_id".to_string(),
            generated_uuid: false,
        }),
        None => None,
    }
}

/// The lookup column of a repository.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordKey {
    pub name: String,
    /// String keys are filled with a UUID on create when the caller omits them.
    pub generated_uuid: bool,
}

impl RecordKey {
    fn from_field(field: &ModelField) -> Self {
        Self {
            name: field.name.clone(),
            generated_uuid: field.field_type == ModelFieldType::String,
        }
    }
}

/// Generates `src/repositories/<model>.repository.ts`.
pub(crate) fn generate_repository(named: &NamedModel, engine: StorageEngine) -> String {
    let NamedModel { model, naming } = named;
    let key = record_key(model, engine);

    let mut output = String::new();
    output.push_str(GENERATED_HEADER);
    if key.as_ref().is_some_and(|k| k.generated_uuid) {
        output.push_str("import { randomUUID } from 'node:crypto';\n");
    }
    output.push_str("import type { Request } from 'express';\n");
    if engine.is_sql() {
        output.push_str("import { db } from '../db/client';\n");
        output.push_str("import { applyFilters, type FindManyOptions } from '../db/filters';\n");
    } else {
        output.push_str("import { buildFilter, type FindManyOptions } from '../db/filters';\n");
        output.push_str(&format!(
            "import {{ {}Model }} from '../models/{}.model';\n",
            naming.type_name, naming.stem
        ));
    }
    output.push_str(&format!(
        "import type {{ {} }} from '../types/models';\n\n",
        naming.type_name
    ));

    if engine.is_sql() {
        output.push_str(&format!("const TABLE = {};\n", quote(&naming.stem)));
    }
    let columns: Vec<String> = model.fields.iter().map(|f| quote(&f.name)).collect();
    output.push_str(&format!("const COLUMNS = [{}];\n\n", columns.join(", ")));

    output.push_str("function pick(input: Record<string, unknown>): Record<string, unknown> {\n");
    output.push_str("  const row: Record<string, unknown> = {};\n");
    output.push_str("  for (const column of COLUMNS) {\n");
    output.push_str("    if (input[column] !== undefined) row[column] = input[column];\n");
    output.push_str("  }\n");
    output.push_str("  return row;\n");
    output.push_str("}\n\n");

    let body = if engine.is_sql() {
        sql_functions(naming, engine, key.as_ref())
    } else {
        mongo_functions(naming, key.as_ref())
    };
    output.push_str(&body);

    let exported = if key.is_some() {
        "findMany, findById, create, update, remove"
    } else {
        "findMany, create"
    };
    output.push_str(&format!(
        "export const {} = {{ {} }};\n",
        naming.repository, exported
    ));
    output
}

fn fill_key(key: Option<&RecordKey>) -> String {
    match key {
        Some(key) if key.generated_uuid => format!(
            "  if (row[{k}] === undefined) row[{k}] = randomUUID();\n",
            k = quote(&key.name)
        ),
        _ => String::new(),
    }
}

fn sql_functions(naming: &ModelNaming, engine: StorageEngine, key: Option<&RecordKey>) -> String {
    let ty = &naming.type_name;
    let mut output = String::new();

    output.push_str(&format!(
        "async function findMany(req: Request, options: FindManyOptions = {{}}): Promise<{}[]> {{\n",
        ty
    ));
    output.push_str("  let query = db(TABLE).select(options.select?.length ? options.select : '*');\n");
    output.push_str("  query = applyFilters(query, options.filters ?? [], req);\n");
    output.push_str("  if (options.orderBy) query = query.orderBy(options.orderBy.field, options.orderBy.direction);\n");
    output.push_str("  if (options.limit !== undefined) query = query.limit(options.limit);\n");
    output.push_str(&format!("  return (await query) as {}[];\n", ty));
    output.push_str("}\n\n");

    if let Some(key) = key {
        let k = quote(&key.name);
        output.push_str(&format!(
            "async function findById(id: string): Promise<{} | null> {{\n",
            ty
        ));
        output.push_str(&format!("  const row = await db(TABLE).where({}, id).first();\n", k));
        output.push_str(&format!("  return (row as {} | undefined) ?? null;\n", ty));
        output.push_str("}\n\n");
    }

    output.push_str(&format!(
        "async function create(input: Record<string, unknown>): Promise<{}> {{\n",
        ty
    ));
    output.push_str("  const row = pick(input);\n");
    output.push_str(&fill_key(key));
    match (engine, key) {
        (StorageEngine::Postgresql, _) => {
            output.push_str("  const [created] = await db(TABLE).insert(row).returning('*');\n");
            output.push_str(&format!("  return created as {};\n", ty));
        }
        (_, Some(key)) => {
            let k = quote(&key.name);
            output.push_str("  const [insertedId] = await db(TABLE).insert(row);\n");
            output.push_str(&format!(
                "  const created = await findById(String(row[{}] ?? insertedId));\n",
                k
            ));
            output.push_str(&format!("  return created ?? (row as unknown as {});\n", ty));
        }
        (_, None) => {
            output.push_str("  await db(TABLE).insert(row);\n");
            output.push_str(&format!("  return row as unknown as {};\n", ty));
        }
    }
    output.push_str("}\n\n");

    if let Some(key) = key {
        let k = quote(&key.name);
        output.push_str(&format!(
            "async function update(id: string, input: Record<string, unknown>): Promise<{} | null> {{\n",
            ty
        ));
        output.push_str("  const changes = pick(input);\n");
        output.push_str(&format!("  delete changes[{}];\n", k));
        output.push_str("  if (Object.keys(changes).length > 0) {\n");
        output.push_str(&format!("    await db(TABLE).where({}, id).update(changes);\n", k));
        output.push_str("  }\n");
        output.push_str("  return findById(id);\n");
        output.push_str("}\n\n");

        output.push_str("async function remove(id: string): Promise<boolean> {\n");
        output.push_str(&format!("  const count = await db(TABLE).where({}, id).del();\n", k));
        output.push_str("  return count > 0;\n");
        output.push_str("}\n\n");
    }

    output
}

fn mongo_functions(naming: &ModelNaming, key: Option<&RecordKey>) -> String {
    let ty = &naming.type_name;
    let model = format!("{}Model", naming.type_name);
    let mut output = String::new();

    output.push_str(&format!(
        "async function findMany(req: Request, options: FindManyOptions = {{}}): Promise<{}[]> {{\n",
        ty
    ));
    output.push_str(&format!(
        "  let query = {}.find(buildFilter(options.filters ?? [], req));\n",
        model
    ));
    output.push_str("  if (options.select?.length) query = query.select(options.select.join(' '));\n");
    output.push_str("  if (options.orderBy) {\n");
    output.push_str("    query = query.sort({ [options.orderBy.field]: options.orderBy.direction === 'desc' ? -1 : 1 });\n");
    output.push_str("  }\n");
    output.push_str("  if (options.limit !== undefined) query = query.limit(options.limit);\n");
    output.push_str(&format!("  return (await query.lean()) as {}[];\n", ty));
    output.push_str("}\n\n");

    if let Some(key) = key {
        let k = quote(&key.name);
        output.push_str(&format!(
            "async function findById(id: string): Promise<{} | null> {{\n",
            ty
        ));
        output.push_str(&format!(
            "  return (await {}.findOne({{ [{}]: id }}).lean()) as {} | null;\n",
            model, k, ty
        ));
        output.push_str("}\n\n");
    }

    output.push_str(&format!(
        "async function create(input: Record<string, unknown>): Promise<{}> {{\n",
        ty
    ));
    output.push_str("  const row = pick(input);\n");
    output.push_str(&fill_key(key));
    output.push_str(&format!("  const created = await {}.create(row);\n", model));
    output.push_str(&format!("  return created.toObject() as {};\n", ty));
    output.push_str("}\n\n");

    if let Some(key) = key {
        let k = quote(&key.name);
        output.push_str(&format!(
            "async function update(id: string, input: Record<string, unknown>): Promise<{} | null> {{\n",
            ty
        ));
        output.push_str("  const changes = pick(input);\n");
        output.push_str(&format!("  delete changes[{}];\n", k));
        output.push_str(&format!(
            "  return (await {}.findOneAndUpdate({{ [{}]: id }}, {{ $set: changes }}, {{ new: true }}).lean()) as {} | null;\n",
            model, k, ty
        ));
        output.push_str("}\n\n");

        output.push_str("async function remove(id: string): Promise<boolean> {\n");
        output.push_str(&format!(
            "  const result = await {}.deleteOne({{ [{}]: id }});\n",
            model, k
        ));
        output.push_str("  return result.deletedCount > 0;\n");
        output.push_str("}\n\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> DataModel {
        DataModel::new(
            "Product",
            vec![
                ModelField::new("_id", ModelFieldType::String).id(),
                ModelField::new("name", ModelFieldType::String).required(),
                ModelField::new("price", ModelFieldType::Int).required(),
            ],
        )
    }

    #[test]
    fn test_postgres_repository() {
        let ts = generate_repository(&NamedModel::new(&product()), StorageEngine::Postgresql);
        assert!(ts.contains("import { randomUUID } from 'node:crypto';"));
        assert!(ts.contains("const TABLE = 'product';"));
        assert!(ts.contains("const COLUMNS = ['_id', 'name', 'price'];"));
        assert!(ts.contains("if (row['_id'] === undefined) row['_id'] = randomUUID();"));
        assert!(ts.contains(".insert(row).returning('*');"));
        assert!(ts.contains("const row = await db(TABLE).where('_id', id).first();"));
        assert!(ts.contains("export const productRepository = { findMany, findById, create, update, remove };"));
    }

    #[test]
    fn test_sqlite_create_reads_back() {
        let ts = generate_repository(&NamedModel::new(&product()), StorageEngine::Sqlite);
        assert!(!ts.contains("returning"));
        assert!(ts.contains("const created = await findById(String(row['_id'] ?? insertedId));"));
    }

    #[test]
    fn test_mongo_repository() {
        let ts = generate_repository(&NamedModel::new(&product()), StorageEngine::Mongodb);
        assert!(ts.contains("import { ProductModel } from '../models/product.model';"));
        assert!(ts.contains("ProductModel.find(buildFilter(options.filters ?? [], req))"));
        assert!(ts.contains("ProductModel.findOneAndUpdate({ ['_id']: id }, { $set: changes }, { new: true })"));
        assert!(!ts.contains("db(TABLE)"));
    }

    #[test]
    fn test_model_without_key() {
        let log = DataModel::new("AuditLog", vec![ModelField::new("message", ModelFieldType::String)]);

        let sql = generate_repository(&NamedModel::new(&log), StorageEngine::Postgresql);
        assert!(sql.contains("export const auditLogRepository = { findMany, create };"));
        assert!(!sql.contains("randomUUID"));
        assert!(record_key(&log, StorageEngine::Postgresql).is_none());

        let mongo = generate_repository(&NamedModel::new(&log), StorageEngine::Mongodb);
        assert!(mongo.contains("findMany, findById, create, update, remove"));
        assert_eq!(
            record_key(&log, StorageEngine::Mongodb).map(|k| k.name),
            Some("_id".to_string())
        );
    }
}
