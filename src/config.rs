/// Configuration
///
/// A small JSON file in `~/.bashtrack/` holding the exclude patterns and the
/// database location. A file that exists but doesn't parse is an error; it
/// is never silently replaced with defaults.

use crate::error::{RecallError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "bashtrack";
pub const CONFIG_FILE: &str = "config.json";
pub const DB_FILE: &str = "commands.db";

/// Overrides the configuration directory
pub const CONFIG_DIR_ENV: &str = "BASHTRACK_CONFIG_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub database_path: PathBuf,
}

impl Config {
    /// Defaults for a given configuration directory
    pub fn defaults(config_dir: &Path) -> Self {
        Self {
            exclude_patterns: default_exclude_patterns(),
            database_path: config_dir.join(DB_FILE),
        }
    }

    /// Load `config.json` from `config_dir`, writing defaults if it is missing
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(CONFIG_FILE);

        if !path.exists() {
            fs::create_dir_all(config_dir)?;
            let config = Self::defaults(config_dir);
            config.save(&path)?;
            return Ok(config);
        }

        let mut config = Self::load_from_path(&path)?;
        if config.database_path.as_os_str().is_empty() {
            config.database_path = config_dir.join(DB_FILE);
        }

        Ok(config)
    }

    /// Parse a config file without touching it
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| {
            RecallError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Write as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Append a pattern; false if it was already there
    pub fn add_exclude_pattern(&mut self, pattern: &str) -> bool {
        if self.exclude_patterns.iter().any(|p| p == pattern) {
            return false;
        }
        self.exclude_patterns.push(pattern.to_string());
        true
    }

    /// Remove a pattern by exact match; false if it wasn't there
    pub fn remove_exclude_pattern(&mut self, pattern: &str) -> bool {
        match self.exclude_patterns.iter().position(|p| p == pattern) {
            Some(index) => {
                self.exclude_patterns.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Navigation, history, anything that looks like a credential, and ourselves
pub fn default_exclude_patterns() -> Vec<String> {
    [
        "^ls.*",
        "^cd.*",
        "^pwd.*",
        "^clear.*",
        "^exit.*",
        "^history.*",
        ".*password.*",
        ".*secret.*",
        ".*token.*",
        ".*key.*",
    ]
    .iter()
    .map(|p| p.to_string())
    .chain(std::iter::once(format!(".*{}.*", APP_NAME)))
    .collect()
}

/// `$BASHTRACK_CONFIG_DIR`, or `~/.bashtrack`
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| RecallError::Config("Could not determine home directory".to_string()))?;

    Ok(home.join(format!(".{}", APP_NAME)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExclusionFilter;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_writes_defaults() {
        let dir = TempDir::new().unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert!(dir.path().join(CONFIG_FILE).exists());
        assert_eq!(config.database_path, dir.path().join(DB_FILE));
        assert_eq!(config.exclude_patterns, default_exclude_patterns());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let config = Config {
            exclude_patterns: vec!["test1".to_string(), "test2".to_string()],
            database_path: dir.path().join("test.db"),
        };
        config.save(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.exclude_patterns.len(), 2);
        assert_eq!(loaded.exclude_patterns[0], "test1");
    }

    #[test]
    fn test_malformed_config_is_fatal_and_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();

        match Config::load(dir.path()) {
            Err(RecallError::Config(msg)) => assert!(msg.contains("failed to parse")),
            other => panic!("Expected Config error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_empty_database_path_falls_back() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"exclude_patterns": ["^ls$"]}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.database_path, dir.path().join(DB_FILE));
        assert_eq!(config.exclude_patterns, vec!["^ls$"]);
    }

    #[test]
    fn test_add_and_remove_patterns() {
        let mut config = Config::defaults(Path::new("/tmp"));
        let before = config.exclude_patterns.len();

        assert!(config.add_exclude_pattern("^vim"));
        assert!(!config.add_exclude_pattern("^vim"));
        assert_eq!(config.exclude_patterns.len(), before + 1);
        assert_eq!(config.exclude_patterns.last().map(String::as_str), Some("^vim"));

        assert!(config.remove_exclude_pattern("^vim"));
        assert!(!config.remove_exclude_pattern("^vim"));
        assert_eq!(config.exclude_patterns.len(), before);
    }

    #[test]
    fn test_defaults_exclude_expected_commands() {
        let filter = ExclusionFilter::new(&default_exclude_patterns());

        for excluded in ["ls -la", "cd ..", "pwd", "clear", "exit", "history | tail", "export api_key=1", "bashtrack list"] {
            assert!(filter.is_excluded(excluded), "{} should be excluded", excluded);
        }
        for kept in ["git status", "cargo build", "docker ps"] {
            assert!(!filter.is_excluded(kept), "{} should be kept", kept);
        }
    }
}
