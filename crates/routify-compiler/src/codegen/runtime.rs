//! Runtime TypeScript modules embedded at compile time.
//!
//! These modules are written in TypeScript in the `runtime/` directory
//! and embedded into the compiler binary using `include_str!`.

use crate::ir::StorageEngine;

/// Authentication (jwt / apiKey / basic) and role-check middleware.
pub const AUTH: &str = include_str!("../../runtime/auth.ts");
/// Recursive request body validation.
pub const VALIDATE: &str = include_str!("../../runtime/validate.ts");
/// 404 and error handlers.
pub const ERRORS: &str = include_str!("../../runtime/errors.ts");
/// Fixed-window rate limiting.
pub const RATE_LIMIT: &str = include_str!("../../runtime/rate-limit.ts");
/// Filter application for Knex query builders.
pub const FILTERS_KNEX: &str = include_str!("../../runtime/filters.knex.ts");
/// Filter documents for Mongoose.
pub const FILTERS_MONGO: &str = include_str!("../../runtime/filters.mongo.ts");

/// Which optional runtime modules a project needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeNeeds {
    pub auth: bool,
    pub rate_limit: bool,
}

/// Returns the runtime modules for a project as (filename, content) pairs.
pub fn get_runtime_modules(engine: StorageEngine, needs: RuntimeNeeds) -> Vec<(&'static str, &'static str)> {
    let mut modules = vec![
        ("src/middleware/validate.ts", VALIDATE),
        ("src/middleware/errors.ts", ERRORS),
    ];
    if needs.auth {
        modules.push(("src/middleware/auth.ts", AUTH));
    }
    if needs.rate_limit {
        modules.push(("src/middleware/rate-limit.ts", RATE_LIMIT));
    }

    let filters = if engine.is_sql() { FILTERS_KNEX } else { FILTERS_MONGO };
    modules.push(("src/db/filters.ts", filters));
    modules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_runtime_exports_middleware() {
        assert!(AUTH.contains("export function authenticate"));
        assert!(AUTH.contains("export function requireRoles"));
    }

    #[test]
    fn filters_follow_engine() {
        let sql = get_runtime_modules(StorageEngine::Sqlite, RuntimeNeeds::default());
        let filters = sql.iter().find(|(name, _)| *name == "src/db/filters.ts").unwrap();
        assert!(filters.1.contains("export function applyFilters"));
        assert!(!sql.iter().any(|(name, _)| *name == "src/middleware/auth.ts"));

        let mongo = get_runtime_modules(
            StorageEngine::Mongodb,
            RuntimeNeeds { auth: true, rate_limit: true },
        );
        let filters = mongo.iter().find(|(name, _)| *name == "src/db/filters.ts").unwrap();
        assert!(filters.1.contains("export function buildFilter"));
        assert_eq!(mongo.len(), 5);
    }
}
