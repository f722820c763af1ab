//! Dashboard configuration.
//!
//! Configuration is loaded from `~/.buildshift/config.yaml` when present;
//! every field has a default matching the original deployment, so the
//! dashboard runs with no config file at all.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BuildShiftError, Result};

/// Dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the BuildShift backend
    pub base_url: String,

    /// Named Notion database used for the leaderboard console integration
    pub leaderboard_database: String,

    /// Named Notion database holding the task board. Fetched over the same
    /// console integration route as the leaderboard, but its pages carry
    /// task properties (Title/Status/Due Date) rather than counter totals.
    pub tasks_database: String,

    /// Notion integration key name passed as the `integration` query param
    pub notion_integration: String,

    /// Notion database id holding the recipe list
    pub recipe_database_id: String,

    /// Which ingredient fields are user-controlled, keyed by recipe name.
    /// Fields not listed here render read-only and are computed server-side.
    pub controlling_inputs: HashMap<String, Vec<String>>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Page size for the infinite-scroll windows
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            leaderboard_database: "leaderboard".to_string(),
            tasks_database: "tasks".to_string(),
            notion_integration: "NOTION_API_KEY_PROJECT_MANAGEMENT".to_string(),
            recipe_database_id: "2a9cee7d24dc80a19293e3b115aed0a6".to_string(),
            controlling_inputs: HashMap::new(),
            timeout_secs: 30,
            page_size: 10,
        }
    }
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no config file exists.
    pub fn load() -> Result<Self> {
        let path = default_config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BuildShiftError::io("reading config", path, e))?;

        let config: Config =
            serde_yaml::from_str(&contents).map_err(|e| BuildShiftError::ConfigInvalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(BuildShiftError::ConfigValidation {
                message: "base_url must not be empty".into(),
            });
        }
        if self.page_size == 0 {
            return Err(BuildShiftError::ConfigValidation {
                message: "page_size must be at least 1".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(BuildShiftError::ConfigValidation {
                message: "timeout_secs must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Override the base URL (from the CLI flag).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Get the default config file path.
///
/// Returns `~/.buildshift/config.yaml`
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| BuildShiftError::Internal {
        message: "home directory not found".into(),
    })?;

    Ok(home.join(".buildshift").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 10);
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_task_board_and_leaderboard_use_distinct_databases() {
        let config = Config::default();
        assert_eq!(config.tasks_database, "tasks");
        assert_ne!(config.tasks_database, config.leaderboard_database);
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "base_url: https://admin.buildshift.example\npage_size: 25\ntasks_database: sprint-board\ncontrolling_inputs:\n  \"Vanilla Base\":\n    - \"Milk (L)\"\n    - \"Sugar (kg)\""
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "https://admin.buildshift.example");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.tasks_database, "sprint-board");
        assert_eq!(
            config.controlling_inputs["Vanilla Base"],
            vec!["Milk (L)", "Sugar (kg)"]
        );
        // Unspecified fields keep their defaults
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_page_size_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "page_size: 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "base_url: [unterminated\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.is_config_error());
    }
}
