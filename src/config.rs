use std::{env, fs, path::PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_ENV: &str = "CAMP_CONFIG";
pub const DATABASE_PATH_ENV: &str = "CAMP_DATABASE_PATH";

/// What happens to signups when their camper or activity is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Remove the dependent signups in the same transaction.
    #[default]
    Cascade,
    /// Refuse the delete while any signup still references the row.
    Restrict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    pub journal_mode: String,
    pub delete_policy: DeletePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("camp.sqlite3"),
            journal_mode: "WAL".into(),
            delete_policy: DeletePolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Read a JSON config file; a missing file yields the defaults.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    /// `CAMP_CONFIG` picks the file, `CAMP_DATABASE_PATH` overrides the database location.
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(PathBuf::from(path))?,
            None => Self::default(),
        };

        if let Some(path) = env::var_os(DATABASE_PATH_ENV) {
            config.database_path = PathBuf::from(path);
        }

        Ok(config)
    }

    pub fn save(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(&path, serialized)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}
