use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::parsing::DEFAULT_REGISTRY_HOST;

pub const DEFAULT_CONFIG_FILE: &str = "tfmodgen.toml";

/// Settings read from `tfmodgen.toml`. Command line flags take precedence.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_binary")]
    pub binary: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub desc_as_comment: bool,
    #[serde(default = "default_registry_host")]
    pub registry_host: String,
}

fn default_directory() -> PathBuf { PathBuf::from("terraform") }
fn default_binary() -> String { "terraform".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_registry_host() -> String { DEFAULT_REGISTRY_HOST.to_string() }

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            directory: default_directory(),
            binary: default_binary(),
            log_level: default_log_level(),
            desc_as_comment: false,
            registry_host: default_registry_host(),
        }
    }
}

impl ToolConfig {
    /// Loads the given file, or `tfmodgen.toml` from the current directory
    /// when present, or the defaults. An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file '{}': {}", path.display(), e)))?;
        let config: ToolConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config file '{}': {}", path.display(), e)))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: ToolConfig = toml::from_str("binary = \"tofu\"\n").unwrap();
        assert_eq!(config.binary, "tofu");
        assert_eq!(config.directory, PathBuf::from("terraform"));
        assert_eq!(config.log_level, "info");
        assert!(!config.desc_as_comment);
        assert_eq!(config.registry_host, "registry.terraform.io");
    }

    #[test]
    fn loads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            "directory = \"out\"\ndesc_as_comment = true\nregistry_host = \"registry.opentofu.org\"\n",
        )
        .unwrap();

        let config = ToolConfig::load(Some(&path)).unwrap();
        assert_eq!(config.directory, PathBuf::from("out"));
        assert!(config.desc_as_comment);
        assert_eq!(config.registry_host, "registry.opentofu.org");
        assert_eq!(config.binary, "terraform");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ToolConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tfmodgen.toml");
        fs::write(&path, "binnary = \"tofu\"\n").unwrap();
        let err = ToolConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("invalid config file"));
    }
}
