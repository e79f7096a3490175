// ⚙️ Migration Configuration
//
// Optional TOML file; every field has a default so an empty file (or no
// file at all) gives the stock behavior.

use crate::coerce::NumberPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE_PATH: &str = "v1_export.json";
pub const DEFAULT_OUTPUT_PATH: &str = "autohub_v2_migration_data.json";
pub const DEFAULT_LOG_PATH: &str = "migration_log.txt";
pub const DEFAULT_OWNER_FIELD: &str = "userCreated";

/// Order in which each collection's records are transformed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrder {
    /// Whatever order the store returns; no guarantee across runs
    #[default]
    Store,
    /// Sorted by v1 document key for reproducible output
    SourceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// JSON dump of the v1 store
    pub source_path: PathBuf,

    /// Where the v2 export is written
    pub output_path: PathBuf,

    /// Run log (appended)
    pub log_path: PathBuf,

    /// Field holding the owning account's email in every v1 collection
    pub owner_field: String,

    pub number_policy: NumberPolicy,

    pub order: SourceOrder,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        MigrationConfig {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            owner_field: DEFAULT_OWNER_FIELD.to_string(),
            number_policy: NumberPolicy::default(),
            order: SourceOrder::default(),
        }
    }
}

impl MigrationConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = MigrationConfig::from_toml("").unwrap();

        assert_eq!(config, MigrationConfig::default());
        assert_eq!(config.output_path, PathBuf::from("autohub_v2_migration_data.json"));
        assert_eq!(config.log_path, PathBuf::from("migration_log.txt"));
        assert_eq!(config.owner_field, "userCreated");
        assert_eq!(config.number_policy, NumberPolicy::Lenient);
        assert_eq!(config.order, SourceOrder::Store);
    }

    #[test]
    fn test_partial_config() {
        let config = MigrationConfig::from_toml(
            r#"
            source_path = "dumps/firestore.json"
            number_policy = "strict"
            order = "source_id"
            "#,
        )
        .unwrap();

        assert_eq!(config.source_path, PathBuf::from("dumps/firestore.json"));
        assert_eq!(config.number_policy, NumberPolicy::Strict);
        assert_eq!(config.order, SourceOrder::SourceId);
        assert_eq!(config.owner_field, DEFAULT_OWNER_FIELD);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(MigrationConfig::from_toml(r#"number_policy = "sometimes""#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migrate.toml");
        std::fs::write(&path, "log_path = \"runs/log.txt\"\n").unwrap();

        let config = MigrationConfig::load(&path).unwrap();
        assert_eq!(config.log_path, PathBuf::from("runs/log.txt"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(MigrationConfig::load(&dir.path().join("nope.toml")).is_err());
    }
}
