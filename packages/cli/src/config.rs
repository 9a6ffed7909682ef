use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "expectations.config.json";

/// Expectations CLI configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the session files
    #[serde(default = "default_session_dir")]
    pub session_dir: String,

    /// Scopes the session keys (`<assignmentId>_config`, ...)
    #[serde(default = "default_assignment_id")]
    pub assignment_id: String,
}

fn default_session_dir() -> String {
    ".expectations".to_string()
}

fn default_assignment_id() -> String {
    "global".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, session_dir: Option<String>, assignment_id: Option<String>) -> Self {
        if let Some(dir) = session_dir {
            self.session_dir = dir;
        }
        if let Some(id) = assignment_id {
            self.assignment_id = id;
        }
        self
    }

    /// Get absolute path to the session directory
    pub fn get_session_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.session_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_dir: default_session_dir(),
            assignment_id: default_assignment_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "sessionDir": "state",
            "assignmentId": "stats-101"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.session_dir, "state");
        assert_eq!(config.assignment_id, "stats-101");
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.session_dir, ".expectations");
        assert_eq!(config.assignment_id, "global");
    }

    #[test]
    fn test_flags_override_file() {
        let config = Config::default().with_overrides(None, Some("essay-3".into()));
        assert_eq!(config.session_dir, ".expectations");
        assert_eq!(config.assignment_id, "essay-3");
    }

    #[test]
    fn test_load_missing_and_present() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{"sessionDir": "s"}"#).unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.session_dir, "s");
        assert_eq!(config.get_session_dir(dir.path()), dir.path().join("s"));
    }
}
