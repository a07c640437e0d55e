//! Project-wide settings.

use serde::{Deserialize, Serialize};

/// Storage engine of the generated backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngine {
    #[default]
    Postgresql,
    Mysql,
    Sqlite,
    Mongodb,
}

impl StorageEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageEngine::Postgresql => "postgresql",
            StorageEngine::Mysql => "mysql",
            StorageEngine::Sqlite => "sqlite",
            StorageEngine::Mongodb => "mongodb",
        }
    }

    /// SQL engines are served through Knex; MongoDB through Mongoose.
    pub fn is_sql(&self) -> bool {
        !matches!(self, StorageEngine::Mongodb)
    }
}

impl std::str::FromStr for StorageEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(StorageEngine::Postgresql),
            "mysql" => Ok(StorageEngine::Mysql),
            "sqlite" => Ok(StorageEngine::Sqlite),
            "mongodb" | "mongo" => Ok(StorageEngine::Mongodb),
            other => Err(format!(
                "unknown storage engine '{}' (expected postgresql, mysql, sqlite or mongodb)",
                other
            )),
        }
    }
}

/// Runtime target of the generated project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Nodejs,
    #[default]
    Typescript,
}

/// Route file layout of the generated project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStyle {
    /// One router module per resource tag.
    #[default]
    Rest,
    /// Every route in a single module.
    Minimal,
}

/// Settings shared by every artifact of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectSettings {
    pub database: StorageEngine,
    pub port: u16,
    pub base_path: String,
    pub enable_swagger: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub target: Target,
    pub api_style: ApiStyle,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            database: StorageEngine::Postgresql,
            port: 3000,
            base_path: "/api".to_string(),
            enable_swagger: true,
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            target: Target::Typescript,
            api_style: ApiStyle::Rest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_merge_over_defaults() {
        let settings: ProjectSettings =
            serde_json::from_str(r#"{ "database": "mongodb", "port": 8080 }"#).unwrap();
        assert_eq!(settings.database, StorageEngine::Mongodb);
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.base_path, "/api");
        assert_eq!(settings.cors_origins, vec!["*"]);
        assert_eq!(settings.api_style, ApiStyle::Rest);
    }

    #[test]
    fn test_engine_from_str() {
        assert_eq!("postgres".parse::<StorageEngine>().unwrap(), StorageEngine::Postgresql);
        assert_eq!("MySQL".parse::<StorageEngine>().unwrap(), StorageEngine::Mysql);
        assert!("oracle".parse::<StorageEngine>().is_err());
        assert!(!StorageEngine::Mongodb.is_sql());
    }
}
