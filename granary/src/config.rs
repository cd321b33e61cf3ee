use crate::error::{GranaryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default name of the build configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "granary.yaml";

/// Resolved build configuration. Every path is relative to the working
/// directory unless the config file says otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one schema definition file per table.
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,
    /// Directory holding one data directory per table, named after the table.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory the build artifact is written into.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("schemas")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("_build")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            schema_dir: default_schema_dir(),
            data_dir: default_data_dir(),
            build_dir: default_build_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file. An unreadable or malformed file
    /// is a fatal precondition error: the build environment is unusable.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GranaryError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            GranaryError::Config(format!("invalid config {}: {e}", path.display()))
        })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.schema_dir, PathBuf::from("schemas"));
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.build_dir, PathBuf::from("_build"));
    }

    #[test]
    fn test_load_with_partial_keys() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("granary.yaml");
        std::fs::write(&path, "schema_dir: defs\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.schema_dir, PathBuf::from("defs"));
        // Unset keys fall back to defaults
        assert_eq!(config.build_dir, PathBuf::from("_build"));
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let result = Config::load(Path::new("/nonexistent/granary.yaml"));
        assert!(matches!(result, Err(GranaryError::Config(_))));
    }

    #[test]
    fn test_load_malformed_file_is_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("granary.yaml");
        std::fs::write(&path, "schema_dir: [unclosed\n").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(GranaryError::Config(_))));
    }
}
