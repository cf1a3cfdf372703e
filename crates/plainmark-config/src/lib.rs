use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file at {config_path}: {reason}")]
    ConfigInvalid {
        config_path: PathBuf,
        reason: String,
    },
}

/// Settings for a site build: where the posts live and which files to
/// compile into which.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned recursively for source files.
    pub posts_dir: PathBuf,

    /// Extension of markup source files, without the dot.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Extension given to the generated HTML next to each source file.
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
}

fn default_source_extension() -> String {
    "md".to_string()
}

fn default_output_extension() -> String {
    "html".to_string()
}

impl Config {
    /// Config for `posts_dir` with the default extensions.
    pub fn new(posts_dir: impl Into<PathBuf>) -> Self {
        Self {
            posts_dir: posts_dir.into(),
            source_extension: default_source_extension(),
            output_extension: default_output_extension(),
        }
    }

    /// Load from a TOML file. A missing file is `Ok(None)`.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config
            .validate()
            .map_err(|reason| ConfigError::ConfigInvalid {
                config_path: config_path.to_path_buf(),
                reason,
            })?;

        config.posts_dir = Self::expand_path(&config.posts_dir).unwrap_or(config.posts_dir);

        Ok(Some(config))
    }

    /// Load from the default location, see [`Config::config_path`].
    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/plainmark");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Both extensions must be set, and they must differ or every build
    /// would overwrite its own sources.
    fn validate(&self) -> Result<(), String> {
        let source = self.source_extension.trim_start_matches('.');
        let output = self.output_extension.trim_start_matches('.');

        if source.is_empty() || output.is_empty() {
            return Err("source_extension and output_extension must not be empty".to_string());
        }
        if source.eq_ignore_ascii_case(output) {
            return Err(format!(
                "source_extension and output_extension are both \"{source}\""
            ));
        }
        Ok(())
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        shellexpand::full(&path_str)
            .ok()
            .map(|expanded| PathBuf::from(expanded.as_ref()))
    }
}
