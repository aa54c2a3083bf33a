use crate::types::DatabaseError;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "dbdesk.toml";
pub const ENV_PREFIX: &str = "DBDESK";

/// Settings shared by the shell and the dump tools
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Database opened on startup
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// Keep shell history in the home directory
    #[serde(default = "default_history")]
    pub history: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Write the `-- dbdesk dump` comment block before exported statements
    #[serde(default)]
    pub dump_header: bool,
}

const fn default_history() -> bool { true }
fn default_log_level() -> String { "warn".to_string() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: None,
            history: default_history(),
            log_level: default_log_level(),
            dump_header: false,
        }
    }
}

impl AppConfig {
    /// Load configuration with priority: ENV > config file > defaults
    ///
    /// An explicit `path` must exist. Without one the first of
    /// `./dbdesk.toml` and `<config dir>/dbdesk/dbdesk.toml` is used, if any.
    /// Command-line values are layered on top by [`AppConfig::apply_overrides`].
    pub fn load(path: Option<&Path>) -> Result<Self, DatabaseError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        } else if let Some(found) = Self::default_paths().into_iter().find(|p| p.is_file()) {
            tracing::debug!(path = %found.display(), "using config file");
            builder = builder.add_source(File::from(found));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        Ok(builder.build()?.try_deserialize::<Self>()?)
    }

    #[must_use]
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".").join(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("dbdesk").join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// CLI args override everything
    pub fn apply_overrides(&mut self, database: Option<PathBuf>, log_level: Option<String>) {
        if let Some(database) = database {
            self.database = Some(database);
        }
        if let Some(log_level) = log_level {
            self.log_level = log_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_file_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(&path, "database = \"/tmp/notes.db\"\ndump_header = true\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.database, Some(PathBuf::from("/tmp/notes.db")));
        assert!(config.dump_header);
        assert!(config.history);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = AppConfig::load(Some(&temp_dir.path().join("absent.toml")));
        assert!(matches!(result, Err(DatabaseError::Config(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some(PathBuf::from("a.db")), None);
        assert_eq!(config.database, Some(PathBuf::from("a.db")));
        assert_eq!(config.log_level, "warn");

        config.apply_overrides(None, Some("debug".to_string()));
        assert_eq!(config.database, Some(PathBuf::from("a.db")));
        assert_eq!(config.log_level, "debug");
    }
}
