//! Project import and export.
//!
//! Projects are stored as the editor's JSON export. Older exports predate
//! several endpoint fields (documentation, auth, parameters, the response
//! list); those are migrated on import so every later stage sees the current
//! shape. Only keys that are absent (or `null`) are filled in, so a project
//! written by [`Project::to_json`] reads back unchanged.

use std::path::Path;

use serde_json::{Map, Value};

use crate::diagnostic::CompilerError;
use crate::ir::Project;

/// The newest project format this compiler understands.
pub const FORMAT_VERSION: u32 = 1;

const DEMO_PROJECT: &str = include_str!("../assets/demo.json");

impl Project {
    /// Parses an exported project, migrating legacy endpoint configs.
    pub fn from_json(json: &str) -> Result<Self, CompilerError> {
        let mut value: Value = serde_json::from_str(json).map_err(|e| CompilerError::ImportFailed {
            message: e.to_string(),
        })?;

        let root = value.as_object_mut().ok_or_else(|| CompilerError::ImportFailed {
            message: "expected a JSON object at the top level".to_string(),
        })?;

        if let Some(found) = root.get("formatVersion").and_then(Value::as_u64) {
            if found > u64::from(FORMAT_VERSION) {
                return Err(CompilerError::UnsupportedFormatVersion {
                    found: u32::try_from(found).unwrap_or(u32::MAX),
                    supported: FORMAT_VERSION,
                });
            }
        }

        // Settings are merged over the defaults field by field
        if root.get("settings").is_some_and(Value::is_null) {
            root.remove("settings");
        }

        if let Some(nodes) = root.get_mut("nodes").and_then(Value::as_array_mut) {
            let mut migrated = 0usize;
            for node in nodes.iter_mut() {
                let is_endpoint = node.pointer("/data/type").and_then(Value::as_str) == Some("endpoint");
                if !is_endpoint {
                    continue;
                }
                if let Some(config) = node.pointer_mut("/data/config").and_then(Value::as_object_mut) {
                    if migrate_endpoint(config) {
                        migrated += 1;
                    }
                }
            }
            if migrated > 0 {
                tracing::debug!(migrated, "migrated legacy endpoint configs");
            }
        }

        serde_json::from_value(value).map_err(|e| CompilerError::ImportFailed {
            message: e.to_string(),
        })
    }

    /// Renders the project as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CompilerError> {
        serde_json::to_string_pretty(self).map_err(|e| CompilerError::SerializeFailed {
            what: "project".to_string(),
            message: e.to_string(),
        })
    }

    /// Load a project file from disk.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Option<Self>, CompilerError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| CompilerError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let project = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            nodes = project.nodes.len(),
            models = project.models.len(),
            "loaded project"
        );
        Ok(Some(project))
    }

    /// Save the project to disk.
    pub fn save(&self, path: &Path) -> Result<(), CompilerError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CompilerError::IoError {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let mut content = self.to_json()?;
        content.push('\n');

        std::fs::write(path, content).map_err(|e| CompilerError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(())
    }

    /// The bundled e-commerce demo: products, orders, users and categories,
    /// one database node per endpoint.
    pub fn demo() -> Result<Self, CompilerError> {
        Self::from_json(DEMO_PROJECT)
    }
}

fn is_missing(config: &Map<String, Value>, key: &str) -> bool {
    config.get(key).map_or(true, Value::is_null)
}

/// Fills absent endpoint fields. Returns whether anything changed.
fn migrate_endpoint(config: &mut Map<String, Value>) -> bool {
    let mut changed = false;

    if is_missing(config, "method") {
        config.insert("method".to_string(), Value::from("GET"));
        changed = true;
    }
    if is_missing(config, "path") {
        config.insert("path".to_string(), Value::from("/api/resource"));
        changed = true;
    }
    if is_missing(config, "summary") {
        let summary = config
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        config.insert("summary".to_string(), Value::from(summary));
        changed = true;
    }

    let defaults: [(&str, fn() -> Value); 7] = [
        ("description", || Value::from("")),
        ("tags", || Value::Array(Vec::new())),
        ("deprecated", || Value::from(false)),
        ("auth", || serde_json::json!({ "required": false, "type": "none", "roles": [] })),
        ("pathParams", || Value::Array(Vec::new())),
        ("queryParams", || Value::Array(Vec::new())),
        ("bodySchema", || Value::Array(Vec::new())),
    ];
    for (key, default) in defaults {
        if is_missing(config, key) {
            config.insert(key.to_string(), default());
            changed = true;
        }
    }

    // Legacy single-response endpoints
    let status_code = config.remove("statusCode");
    let response_schema = config.remove("responseSchema");
    if is_missing(config, "responses") {
        let status_code = status_code
            .filter(|v| v.as_u64().is_some_and(|code| code > 0))
            .unwrap_or_else(|| Value::from(200));
        let schema = response_schema
            .filter(|v| v.is_array())
            .unwrap_or_else(|| Value::Array(Vec::new()));
        config.insert(
            "responses".to_string(),
            serde_json::json!([{
                "statusCode": status_code,
                "description": "Successful response",
                "schema": schema,
            }]),
        );
        changed = true;
    }

    changed
}
